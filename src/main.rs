use camelodds::cli::{Args, BaseCommand, Command};

fn main() {
    let args = Args::new(pico_args::Arguments::from_env());

    match BaseCommand::try_from_cli_args(args) {
        Ok(cmd) => match cmd.run() {
            Ok(out) => println!("{}", out),
            Err(err) => {
                eprintln!("error: {}", err);
                std::process::exit(1);
            }
        },
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("Try 'camelodds --help' for more information.");
            std::process::exit(1);
        }
    }
}
