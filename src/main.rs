use anyhow::Context;
use clap::{Parser, Subcommand};
use medlink_client::registration::{Category, ClientConfig, Role, Session, SessionToken};
use medlink_client::ui::{
    browse, ConsoleShell, DeleteOutcome, Phase, ProfileListing, RegistrationForm, Shell,
    SubmitOutcome,
};
use medlink_client::HttpBackend;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "medlink")]
#[command(about = "Clinic account client: register, browse doctors/patients, delete your account")]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long)]
    api_url: Option<String>,

    /// Override the session file location
    #[arg(long)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new account
    Register {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
        /// patient or doctor
        #[arg(long)]
        role: Option<Role>,
        /// Profile picture, at most 5MB by default
        #[arg(long)]
        picture: Option<PathBuf>,
    },
    /// Print the doctor or patient directory once
    List {
        #[arg(long, default_value = "doctors")]
        category: Category,
    },
    /// Interactive directory: switch tabs and delete your account
    Browse {
        #[arg(long, default_value = "doctors")]
        category: Category,
    },
    /// Delete the account of the stored session
    DeleteAccount,
    /// Manage the stored session token
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Store a token obtained from the login flow
    Set {
        #[arg(long)]
        token: String,
    },
    /// Forget the stored token
    Clear,
    /// Report whether a token is stored
    Show,
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ClientConfig::load(path).context("load config")?,
        None => ClientConfig::default(),
    };

    if let Some(url) = &cli.api_url {
        cfg = cfg.with_api_base_url(url.clone()).context("apply --api-url")?;
    }
    if let Some(path) = &cli.session_file {
        cfg = cfg.with_session_file(path);
    }
    Ok(cfg)
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    let session = Session::from_file(&cfg.session_file);

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            role,
            picture,
        } => {
            let backend = HttpBackend::new(cfg.clone()).context("build HTTP client")?;
            let shell = ConsoleShell;
            let mut form = RegistrationForm::new(&cfg);
            form.set_name(name);
            form.set_email(email);
            form.set_password(password);
            form.set_role(role);

            if let Some(path) = picture {
                if !form.attach_picture_path(&path, &shell).await {
                    return Ok(ExitCode::FAILURE);
                }
            }

            let outcome = form.submit(&backend, &shell).await;
            Ok(exit_code(outcome == SubmitOutcome::Registered))
        }
        Commands::List { category } => {
            let backend = HttpBackend::new(cfg).context("build HTTP client")?;
            let shell = ConsoleShell;
            let mut listing = ProfileListing::new(category);

            listing.refresh(&backend).await;
            shell.render(&listing.render());
            Ok(exit_code(!matches!(listing.phase(), Phase::Failed(_))))
        }
        Commands::Browse { category } => {
            let backend = Arc::new(HttpBackend::new(cfg).context("build HTTP client")?);
            let shell = ConsoleShell;
            let mut listing = ProfileListing::new(category);
            let stdin = BufReader::new(tokio::io::stdin());

            browse::run(&mut listing, backend, &session, &shell, stdin)
                .await
                .context("interactive listing")?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::DeleteAccount => {
            let backend = HttpBackend::new(cfg).context("build HTTP client")?;
            let shell = ConsoleShell;
            let listing = ProfileListing::default();

            let outcome = listing.delete_account(&backend, &session, &shell).await;
            Ok(exit_code(outcome == DeleteOutcome::Deleted))
        }
        Commands::Session { action } => match action {
            SessionAction::Set { token } => {
                let token = SessionToken::new(token).context("token cannot be empty")?;
                session.sign_in(token).context("save session")?;
                println!("Session saved to {}", cfg.session_file.display());
                Ok(ExitCode::SUCCESS)
            }
            SessionAction::Clear => {
                session.sign_out().context("clear session")?;
                println!("Session cleared");
                Ok(ExitCode::SUCCESS)
            }
            SessionAction::Show => {
                if session.is_signed_in() {
                    println!("Signed in (token stored in {})", cfg.session_file.display());
                } else {
                    println!("Not signed in");
                }
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}
