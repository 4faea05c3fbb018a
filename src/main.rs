mod cli;
mod commands;
mod env_loader;
mod error;
mod letterboxd;
mod reel;
mod tmdb;

fn main() {
    env_loader::load_dotenv();

    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
