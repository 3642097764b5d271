use clap::Parser;

/// Reads stdin until a line parses as one of `T`'s subcommands, printing clap's complaint for
/// every line that does not. `None` once stdin is closed.
pub fn read_input<T: clap::FromArgMatches + clap::Subcommand>() -> Option<T> {
    #[derive(Parser)]
    #[command(
        name = "",
        no_binary_name = true,
        disable_help_flag = true,
        disable_version_flag = true,
        next_line_help = false,
        help_template = "{usage-heading} {usage}\n{all-args}"
    )]
    struct Input<T: clap::FromArgMatches + clap::Subcommand> {
        #[command(subcommand)]
        command: T,
    }

    loop {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Err(_) | Ok(0) => return None,
            Ok(_) => {}
        }

        let parts = line.split_whitespace();
        if line.trim().is_empty() {
            continue;
        }

        match Input::<T>::try_parse_from(parts) {
            Ok(Input { command }) => return Some(command),
            Err(err) => print!("{err}"),
        }
    }
}
