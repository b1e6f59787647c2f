// dashboard_cli.rs
// Terminal client for the shortlisting dashboard

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use shortlist_api::applications::export::ExportMode;
use shortlist_api::applications::filters::Category;
use shortlist_api::applications::sorting::{SortDirection, SortKey, SortState};
use shortlist_api::applications::subjects::format_subjects;
use shortlist_api::common::config::DEFAULT_ROLL_NUMBER_PREFIX;
use shortlist_api::dashboard::{spawn_refresh_loop, Dashboard, DashboardSettings, HttpBackend};

#[derive(Parser, Debug)]
#[command(name = "shortlist", version, about = "Terminal client for the shortlisting dashboard")]
struct Cli {
    #[arg(long, env = "SHORTLIST_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    #[arg(long, env = "SHORTLIST_USERNAME")]
    username: String,

    #[arg(long, env = "SHORTLIST_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, env = "ROLL_NUMBER_PREFIX", default_value = DEFAULT_ROLL_NUMBER_PREFIX)]
    roll_number_prefix: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the applications under the view options
    List {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Flip one selection
    Toggle {
        application_id: String,
        subject: String,
    },
    /// Write the visible applications to a CSV file
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Only shortlisted (application, subject) rows
        #[arg(long)]
        shortlisted: bool,

        /// Target directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[arg(long)]
        filename: Option<String>,
    },
    /// Reprint the view after every background refresh until Ctrl-C
    Watch {
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Args, Debug, Default, Clone)]
struct ViewArgs {
    /// Search name or roll number
    #[arg(long = "q")]
    query: Option<String>,

    /// Batch year code, e.g. 23
    #[arg(long)]
    batch: Option<String>,

    /// First Year | Second Year | Third Year | Third Year Free Electives
    #[arg(long)]
    category: Option<Category>,

    /// Subject filter, repeatable
    #[arg(long = "subject")]
    subjects: Vec<String>,

    /// date | roll_number | grade
    #[arg(long)]
    sort: Option<SortKey>,

    /// Ascending order (default descending)
    #[arg(long)]
    asc: bool,
}

impl ViewArgs {
    fn sort_state(&self) -> SortState {
        let mut sort = SortState::default();
        if let Some(key) = self.sort {
            sort.key = key;
        }
        if self.asc {
            sort.direction = SortDirection::Asc;
        }
        sort
    }
}

async fn apply_view(dashboard: &Dashboard<HttpBackend>, view: &ViewArgs) {
    dashboard
        .update_filters(|filters| {
            filters.set_category(view.category);
            if let Some(query) = &view.query {
                filters.set_query(query.as_str());
            }
            filters.set_batch(view.batch.as_deref());
            for subject in &view.subjects {
                filters.add_subject(subject);
            }
        })
        .await;
    dashboard.set_sort(view.sort_state()).await;
}

async fn print_view(dashboard: &Dashboard<HttpBackend>) {
    let visible = dashboard.visible().await;
    let selections = dashboard.selections().await;

    for app in &visible {
        let marker = if selections
            .iter()
            .any(|key| key.starts_with(&format!("{}::", app.id)))
        {
            "★"
        } else {
            " "
        };
        println!(
            "{} {:<18} {:<28} {}  [{}]",
            marker,
            app.roll_number,
            app.student_name,
            app.created_at.format("%Y-%m-%d"),
            format_subjects(app)
        );
    }
    println!(
        "\n{} of {} applications shown, {} selections",
        visible.len(),
        dashboard.application_count().await,
        selections.len()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let backend = HttpBackend::login(Client::new(), &cli.api_url, &cli.username, &cli.password)
        .await
        .context("Sign-in failed")?;
    let settings = DashboardSettings {
        roll_number_prefix: cli.roll_number_prefix,
        ..Default::default()
    };
    let dashboard = Dashboard::new(backend, settings);

    dashboard.refresh().await?;

    match cli.command {
        Command::List { view } => {
            apply_view(&dashboard, &view).await;
            print_view(&dashboard).await;
        }
        Command::Toggle {
            application_id,
            subject,
        } => {
            let selected = dashboard.toggle(&application_id, &subject).await?;
            println!(
                "{} {}::{}",
                if selected { "✅ Shortlisted" } else { "➖ Removed" },
                application_id,
                subject.trim()
            );
        }
        Command::Export {
            view,
            shortlisted,
            out,
            filename,
        } => {
            apply_view(&dashboard, &view).await;
            let mode = if shortlisted {
                ExportMode::Shortlisted
            } else {
                ExportMode::Full
            };
            let path = dashboard
                .download_csv(&out, filename.as_deref(), mode)
                .await?;
            println!("✅ Wrote {}", path.display());
        }
        Command::Watch { view } => {
            apply_view(&dashboard, &view).await;
            watch(dashboard).await?;
        }
    }

    Ok(())
}

async fn watch(dashboard: Arc<Dashboard<HttpBackend>>) -> anyhow::Result<()> {
    let worker = spawn_refresh_loop(&dashboard).context("refresh worker already running")?;
    let period = dashboard.settings().refresh_interval;

    print_view(&dashboard).await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(period) => {
                if let Some(error) = dashboard.last_error().await {
                    eprintln!("⚠️  {}", error);
                }
                println!();
                print_view(&dashboard).await;
            }
        }
    }

    worker.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_parses_view_and_output_options() {
        let cli = Cli::try_parse_from([
            "shortlist",
            "--username",
            "staff",
            "--password",
            "secret",
            "export",
            "--batch",
            "23",
            "--category",
            "Second Year",
            "--subject",
            "23CSE211",
            "--subject",
            "23CSE212",
            "--sort",
            "grade",
            "--asc",
            "--shortlisted",
            "--filename",
            "picked",
        ])
        .unwrap();

        let Command::Export {
            view,
            shortlisted,
            out,
            filename,
        } = cli.command
        else {
            panic!("expected export command");
        };
        assert_eq!(view.batch.as_deref(), Some("23"));
        assert_eq!(view.category, Some(Category::SecondYear));
        assert_eq!(view.subjects, vec!["23CSE211", "23CSE212"]);
        assert_eq!(view.sort_state().key, SortKey::Grade);
        assert_eq!(view.sort_state().direction, SortDirection::Asc);
        assert!(shortlisted);
        assert_eq!(out, PathBuf::from("."));
        assert_eq!(filename.as_deref(), Some("picked"));
    }

    #[test]
    fn test_toggle_requires_both_positionals() {
        let result = Cli::try_parse_from([
            "shortlist",
            "--username",
            "staff",
            "--password",
            "secret",
            "toggle",
            "app1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        let result = Cli::try_parse_from([
            "shortlist",
            "--username",
            "staff",
            "--password",
            "secret",
            "list",
            "--sort",
            "salary",
        ]);
        assert!(result.is_err());
    }
}
