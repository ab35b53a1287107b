use crate::{Cli, Service};
/// REPL shell: Reedline-based interactive history session.
use anyhow::Result;
use dot_history_core::commands::Command;
use dot_history_core::display::{format_accounts, short_address};
use reedline::{DefaultCompleter, DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

pub async fn run_repl(cli: &Cli) -> Result<()> {
    println!("dot-history v{}", env!("CARGO_PKG_VERSION"));

    let mut service = cli.build_service()?;
    let chain = service.current_chain().clone();
    println!("Chain: {chain} ({})", chain.genesis_hash);
    let accounts = service.hierarchy().accounts().len();
    if accounts > 0 {
        println!("Known accounts: {accounts}");
    }
    println!();

    match service.address() {
        Some(address) => {
            println!("Showing history for {address}.");
            if let Ok(out) = (Command::History { filter: None }).execute(&mut service, false).await {
                println!("{out}");
            }
        }
        None => {
            if accounts > 0 {
                println!("{}", format_accounts(service.hierarchy()));
            }
            println!("No address selected. Use 'address <address>' to show history.");
        }
    }
    println!("Type 'help' for a list of commands.");
    println!();

    let mut prompt = build_prompt(&service, &chain.name);

    let commands: Vec<String> = vec![
        "history".into(),
        "h".into(),
        "ls".into(),
        "all".into(),
        "transfers".into(),
        "staking".into(),
        "more".into(),
        "m".into(),
        "show".into(),
        "tx".into(),
        "import".into(),
        "address".into(),
        "addr".into(),
        "chain".into(),
        "polkadot".into(),
        "kusama".into(),
        "westend".into(),
        "status".into(),
        "help".into(),
        "exit".into(),
        "quit".into(),
        "q".into(),
    ];
    let completer = Box::new(DefaultCompleter::new(commands));
    let mut line_editor = Reedline::create().with_completer(completer);

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match Command::parse(line) {
                    Ok(Command::Exit) => {
                        println!("Goodbye.");
                        break;
                    }
                    Ok(cmd) => {
                        match cmd.execute(&mut service, cli.json).await {
                            Ok(output) => {
                                if !output.is_empty() {
                                    println!("{output}");
                                }
                            }
                            Err(e) => {
                                eprintln!("Error: {e}");
                            }
                        }
                        if cmd.changes_scope() {
                            let chain_name = service.current_chain().name.clone();
                            prompt = build_prompt(&service, &chain_name);
                        }
                    }
                    Err(e) => {
                        eprintln!("{e}");
                    }
                }
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                println!("Goodbye.");
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }
    }

    Ok(())
}

fn build_prompt(service: &Service, chain_name: &str) -> DefaultPrompt {
    let label = match service.address() {
        Some(address) => {
            let name = service
                .hierarchy()
                .name_of(address)
                .map(str::to_string)
                .unwrap_or_else(|| short_address(address));
            format!("[{chain_name} {name}]")
        }
        None => format!("[{chain_name}]"),
    };
    DefaultPrompt::new(
        DefaultPromptSegment::Basic(label),
        DefaultPromptSegment::Empty,
    )
}
