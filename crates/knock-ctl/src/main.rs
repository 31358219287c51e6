//! knock-ctl — operator tooling for the knock gate.

use anyhow::Result;

mod cmd;

fn print_usage() {
    println!("Usage: knock-ctl <command>");
    println!();
    println!("Commands:");
    println!("  hash <secret>        Print an Argon2 hash for gate.key_hash");
    println!("  knock <url> <key>    Present a key to a running gate and replay the cookie");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["hash", secret]               => cmd::hash::cmd_hash(secret),
        ["knock", url, key]            => cmd::knock::cmd_knock(url, key).await,
        ["help"] | ["--help"] | ["-h"] | [] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
