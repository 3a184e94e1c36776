use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use menu_async_runtime::AppLogger;
use menu_pagination::io::{load_document, load_template, save_document, save_template};
use menu_pagination::{Document, EditingSession, EstimatingMeasurer, SessionOptions, Template};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "menut", about = "Menu pagination tools CLI", version)]
struct Cli {
    /// Print the log after the command finishes
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct TemplateOpts {
    /// Built-in template
    #[arg(long, default_value = "classic", value_enum)]
    template: TemplateArg,

    /// Template file (overrides --template)
    #[arg(long)]
    template_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure a document and show overflow and statistics
    Inspect {
        /// Document JSON file
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        template: TemplateOpts,
    },

    /// Reflow every category onto pages by estimated height
    Paginate {
        /// Document JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        template: TemplateOpts,
    },

    /// Import categories and items from CSV
    Import {
        /// Input CSV file (columns: category, name, price, description, featured)
        #[arg(short, long)]
        csv: PathBuf,

        /// Output document JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Existing document to extend instead of starting a new one
        #[arg(long)]
        into: Option<PathBuf>,

        /// 1-based page that receives new categories
        #[arg(long)]
        page: Option<usize>,

        #[command(flatten)]
        template: TemplateOpts,
    },

    /// Write a built-in template to a template file
    Template {
        #[arg(value_enum)]
        name: TemplateArg,

        /// Output template file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateArg {
    Classic,
    Bistro,
}

impl From<TemplateArg> for Template {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Classic => Template::classic(),
            TemplateArg::Bistro => Template::bistro(),
        }
    }
}

impl TemplateOpts {
    async fn load(&self) -> Result<Template> {
        match &self.template_file {
            Some(path) => load_template(path)
                .await
                .with_context(|| format!("Failed to load template {}", path.display())),
            None => Ok(self.template.into()),
        }
    }
}

async fn open(path: &Path, template: Template) -> Result<EditingSession> {
    let document = load_document(path)
        .await
        .with_context(|| format!("Failed to load document {}", path.display()))?;
    Ok(EditingSession::new(document, template, SessionOptions::default())?)
}

fn print_report(session: &mut EditingSession) {
    let overflow = session.recompute_overflow(&EstimatingMeasurer::default()).clone();
    let stats = session.statistics();

    println!("Menu Statistics:");
    println!("  Pages: {}", stats.pages);
    println!("  Categories: {} ({} unassigned)", stats.categories, stats.unassigned);
    println!("  Items: {} ({} featured)", stats.items, stats.featured_items);

    if overflow.is_empty() {
        println!("  No overflowing pages");
    } else {
        for (index, amount) in &overflow {
            println!("  Page {} overflows by {:.0}px", index + 1, amount);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = AppLogger::new(500).with_level(if cli.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    });
    logger.clone().init()?;

    let result = run(cli.command).await;

    if cli.verbose {
        for entry in logger.entries() {
            eprintln!("{entry}");
        }
    }
    result
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Inspect { input, template } => {
            let mut session = open(&input, template.load().await?).await?;
            print_report(&mut session);
        }

        Commands::Paginate {
            input,
            output,
            template,
        } => {
            let mut session = open(&input, template.load().await?).await?;
            let pages = session.auto_paginate()?;
            print_report(&mut session);

            let output = output.unwrap_or(input);
            save_document(session.document(), &output).await?;
            println!("Paginated onto {pages} pages → {}", output.display());
        }

        Commands::Import {
            csv,
            output,
            into,
            page,
            template,
        } => {
            let template = template.load().await?;
            let mut document = match into {
                Some(path) => load_document(&path)
                    .await
                    .with_context(|| format!("Failed to load document {}", path.display()))?,
                None => Document::for_template(&template)?,
            };

            let page_id = match page {
                Some(number) => {
                    let page = number
                        .checked_sub(1)
                        .and_then(|index| document.pages().get(index))
                        .with_context(|| format!("Document has no page {number}"))?;
                    Some(page.id)
                }
                None => None,
            };

            let categories = menu_pagination::load_from_csv(&csv).await?;
            let summary = menu_pagination::import_into(&mut document, categories, page_id)?;

            let session = EditingSession::new(document, template, SessionOptions::default())?;
            save_document(session.document(), &output).await?;
            println!(
                "Imported {} items ({} new categories, {} extended) → {}",
                summary.items,
                summary.created.len(),
                summary.extended.len(),
                output.display()
            );
        }

        Commands::Template { name, output } => {
            let template: Template = name.into();
            save_template(&template, &output).await?;
            println!("Wrote template '{}' → {}", template.id, output.display());
        }
    }

    Ok(())
}
