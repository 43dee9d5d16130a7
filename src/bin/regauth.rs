use regauth_cli::{commands, logging};
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "regauth",
    about = "Manage cached login credentials for container-image registries"
)]
enum Command {
    #[structopt(name = "login")]
    /// Log in to a container registry and cache the credentials
    Login(commands::LoginOpt),

    #[structopt(name = "logout")]
    /// Remove the cached credentials for a registry
    Logout(commands::LogoutOpt),
}

fn main() {
    if let Err(e) = logging::set_up_logging() {
        eprintln!("Error: {}", e);
    }

    let args = Command::from_args();

    let result = match args {
        Command::Login(login_options) => commands::login(login_options),
        Command::Logout(logout_options) => commands::logout(logout_options),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(-1);
    }
}
