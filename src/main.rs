use colored::Colorize;

fn main() {
    if let Err(e) = hotdeals::app::run_cli() {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
