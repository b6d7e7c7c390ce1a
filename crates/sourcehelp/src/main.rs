//
// main.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//

use std::env;

use sourcehelp::backend;

fn print_usage() {
    println!(
        "sourcehelp {}, a completion and signature help server.",
        env!("CARGO_PKG_VERSION")
    );
    print!(
        r#"
Usage: sourcehelp [OPTIONS]

Available options:

--stdio                      Start the LSP server using stdio transport
--version                    Print the version
--help                       Print this help message

Set RUST_LOG (e.g. RUST_LOG=sourcehelp=trace) to control logging on stderr.

"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut argv = env::args();
    argv.next(); // skip executable name

    let mut use_stdio = false;

    for arg in argv {
        match arg.as_str() {
            "--stdio" => use_stdio = true,
            "--version" => {
                println!("sourcehelp {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_usage();
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("Unknown argument: '{other}'"));
            }
        }
    }

    if !use_stdio {
        print_usage();
        return Ok(());
    }

    env_logger::init();

    backend::start_lsp().await
}
