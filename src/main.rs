// Copyright (c) 2025 InterviewLens. All rights reserved.

mod auth;
mod config;
mod consts;
mod environment;
mod profile;
mod render;
mod service;
mod submission;

use crate::auth::session::get_session_path;
use crate::auth::{OidcCredentialProvider, TokenRequest};
use crate::config::{get_config_path, Config};
use crate::environment::Environment;
use crate::profile::{IntervieweeProfile, InterviewerProfile, ProfileForm};
use crate::service::PredictionClient;
use crate::submission::{SubmissionOrchestrator, SubmissionState};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit both profiles and print the predicted interview plan
    Submit {
        /// Path to a JSON file with the interviewee profile. Prompts when omitted.
        #[arg(long, value_name = "FILE")]
        interviewee: Option<PathBuf>,

        /// Path to a JSON file with the interviewer profile. Prompts when omitted.
        #[arg(long, value_name = "FILE")]
        interviewer: Option<PathBuf>,

        /// Write the rendered plan to this file instead of stdout.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Log in via the device flow and store the session
    Login,
    /// Clear the stored session and log out
    Logout,
    /// Show the currently authenticated user
    Whoami,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config_path = get_config_path()?;
    let config = if config_path.exists() {
        Some(Config::load_from_file(&config_path)?)
    } else {
        None
    };

    let lens_environment_str = std::env::var("LENS_ENVIRONMENT").unwrap_or_default();
    let environment_name = if lens_environment_str.is_empty() {
        config
            .as_ref()
            .map(|c| c.environment.clone())
            .unwrap_or_default()
    } else {
        lens_environment_str
    };
    let mut environment = if environment_name.is_empty() {
        Environment::default()
    } else {
        match environment_name.parse::<Environment>() {
            Ok(env) => env,
            Err(_) => {
                eprintln!("Invalid environment: {}", environment_name);
                return Err("Invalid environment".into());
            }
        }
    };
    if let Some(config) = &config {
        config.apply_overrides(&mut environment);
    }

    let args = Args::parse();
    match args.command {
        Command::Submit {
            interviewee,
            interviewer,
            output,
        } => submit(environment, interviewee, interviewer, output).await,
        Command::Login => {
            let provider = OidcCredentialProvider::new(environment, get_session_path()?);
            let info = provider.login(consts::auth::LOGIN_SCOPE).await?;
            if info.name.is_empty() {
                println!("Logged in.");
            } else {
                println!("Logged in as {} <{}>", info.name, info.email);
            }
            Ok(())
        }
        Command::Logout => {
            println!("Logging out and clearing the stored session...");
            let provider = OidcCredentialProvider::new(environment, get_session_path()?);
            provider.logout().await.map_err(Into::into)
        }
        Command::Whoami => {
            let provider = OidcCredentialProvider::new(environment, get_session_path()?);
            let info = provider.userinfo().await?;
            println!("{} <{}>", info.name, info.email);
            if !info.picture.is_empty() {
                println!("Picture: {}", info.picture);
            }
            Ok(())
        }
    }
}

/// Runs one submission: collect the profiles, check required fields, submit,
/// and render the outcome.
async fn submit(
    environment: Environment,
    interviewee: Option<PathBuf>,
    interviewer: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut form = ProfileForm::default();
    form.interviewee = match interviewee {
        Some(path) => IntervieweeProfile::load_from_file(&path)?,
        None => prompt_interviewee()?,
    };
    form.interviewer = match interviewer {
        Some(path) => InterviewerProfile::load_from_file(&path)?,
        None => prompt_interviewer()?,
    };

    // Required-field validation happens here, before the orchestrator is
    // ever invoked.
    if !form.is_complete() {
        eprintln!(
            "All fields are required. Missing: {}",
            form.missing_fields().join(", ")
        );
        return Err("Missing required profile fields".into());
    }

    let token_request = TokenRequest {
        audience: environment.auth_audience.clone(),
        scope: consts::auth::SUBMISSION_SCOPE.to_string(),
    };
    let credentials = OidcCredentialProvider::new(environment.clone(), get_session_path()?);
    let service = PredictionClient::new(environment);
    let orchestrator =
        SubmissionOrchestrator::new(Box::new(credentials), Box::new(service), token_request);

    println!("Submitting profiles...");
    orchestrator.submit(&form).await;
    match orchestrator.state() {
        SubmissionState::Succeeded { document } => {
            let plan = render::render(&document);
            match output {
                Some(path) => {
                    std::fs::write(&path, plan.html)?;
                    println!("Saved interview plan to {}", path.display());
                }
                None => println!("{}", plan.html),
            }
            Ok(())
        }
        SubmissionState::Failed { message } => {
            eprintln!("{}", message);
            Err(message.into())
        }
        state => Err(format!("submission ended in unexpected state: {:?}", state).into()),
    }
}

fn prompt_field(label: &str) -> Result<String, Box<dyn Error>> {
    print!("{}: ", label);
    std::io::stdout().flush()?;
    let mut value = String::new();
    std::io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

fn prompt_interviewee() -> Result<IntervieweeProfile, Box<dyn Error>> {
    println!("Interviewee profile");
    Ok(IntervieweeProfile {
        name: prompt_field("Name")?,
        email: prompt_field("Email")?,
        education: prompt_field("Education")?,
        experience: prompt_field("Professional experience")?,
    })
}

fn prompt_interviewer() -> Result<InterviewerProfile, Box<dyn Error>> {
    println!("Interviewer profile");
    Ok(InterviewerProfile {
        name: prompt_field("Name")?,
        education: prompt_field("Educational experience")?,
        experience: prompt_field("Professional experience")?,
    })
}
