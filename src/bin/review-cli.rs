use clap::{Parser, Subcommand};
use std::path::PathBuf;

use report_review::config::ReviewConfig;
use report_review::review::{ReportForm, ReviewClient};
use report_review::storage::ReportSubmission;

#[derive(Parser)]
#[command(name = "review-cli")]
#[command(about = "Command-line client for the report review backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    url: String,

    /// Model to review with
    #[arg(short, long, default_value = "default")]
    model: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List models the backend offers
    Models,
    /// Review a filled-in report form
    Review {
        file: PathBuf,
        /// Print the raw verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print an empty report form
    Template,
    /// Submit the final report for an uploaded recording
    Submit {
        object_name: String,
        #[arg(long)]
        school: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        time: Option<String>,
        /// File holding the recording's transcript
        #[arg(long)]
        transcript: Option<PathBuf>,
    },
    /// List the latest report of every recording
    Reports,
    /// List submission times of a recording, or show one submission
    History {
        object_name: String,
        /// Show the submission made at this time
        #[arg(long)]
        at: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ReviewConfig {
        endpoint: cli.url,
        model: cli.model,
        ..ReviewConfig::default()
    };
    let client = ReviewClient::new(&config)?;

    match cli.command {
        Commands::Models => {
            for name in client.models().await? {
                println!("{}", name);
            }
        }
        Commands::Review { file, json } => {
            let text = std::fs::read_to_string(&file)?;
            let form = ReportForm::parse(&text);
            let verdict = client.review(&form.render()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                println!("{}", verdict);
            }
            if !verdict.is_pass() {
                std::process::exit(1);
            }
        }
        Commands::Template => {
            print!("{}", ReportForm::template().render());
        }
        Commands::Submit {
            object_name,
            school,
            method,
            phone,
            time,
            transcript,
        } => {
            let transcription_text = match transcript {
                Some(path) => Some(std::fs::read_to_string(path)?),
                None => None,
            };
            let report = ReportSubmission {
                object_name: Some(object_name),
                school,
                method,
                phone,
                time,
                transcription_text,
            };
            println!("{}", client.submit_report(&report).await?);
        }
        Commands::Reports => {
            for report in client.reports().await? {
                println!(
                    "{}\t{}\t{}",
                    report.submission_timestamp,
                    report.object_name,
                    report.school.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::History { object_name, at } => match at {
            Some(timestamp) => {
                let report = client.report(&object_name, &timestamp).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            None => {
                for timestamp in client.report_timestamps(&object_name).await? {
                    println!("{}", timestamp);
                }
            }
        },
    }

    Ok(())
}
