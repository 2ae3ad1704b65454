use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use trans_files::{Delimiters, DumpArguments, FormatKind, Node, Tree, TranslationError, convert};

#[derive(Parser)]
#[command(name = "trans-files")]
#[command(about = "Convert and inspect translation files (YAML, JSON, PHP, XLIFF, PO, MO)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Delimiter joining gettext message context and id (empty disables it)
    #[arg(long, global = true, default_value = "::")]
    context_delimiter: String,

    /// Delimiter joining gettext plural forms (empty disables it)
    #[arg(long, global = true, default_value = "|")]
    plural_delimiter: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a translation file; formats are picked by extension
    Convert {
        /// Input file
        input: PathBuf,

        /// Output file (parent directories are created)
        output: PathBuf,

        /// Render repeated YAML mappings in full instead of anchoring them
        #[arg(long)]
        no_anchors: bool,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,

        /// Language code for the PO/MO header
        #[arg(long)]
        language: Option<String>,

        /// Extra PO/MO header field as KEY=VALUE (repeatable)
        #[arg(long = "metadata", value_name = "KEY=VALUE")]
        metadata: Vec<String>,

        /// XLIFF source locale
        #[arg(long, default_value = "en")]
        source_locale: String,

        /// XLIFF target locale
        #[arg(long, default_value = "en")]
        target_locale: String,

        /// Write XLIFF 1.2 instead of 2.0
        #[arg(long)]
        legacy: bool,

        /// XLIFF 2.0 file id
        #[arg(long, default_value = "f1")]
        file_id: String,
    },

    /// Print the entries of a translation file
    Inspect {
        /// Input file
        input: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    let delimiters = Delimiters::new(Some(&cli.context_delimiter), Some(&cli.plural_delimiter));

    if let Err(e) = run(cli.command, &delimiters) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands, delimiters: &Delimiters) -> Result<(), TranslationError> {
    match command {
        Commands::Convert {
            input,
            output,
            no_anchors,
            compact,
            language,
            metadata,
            source_locale,
            target_locale,
            legacy,
            file_id,
        } => {
            let mut arguments = DumpArguments::default()
                .with_anchors(!no_anchors)
                .with_pretty(!compact)
                .with_locales(source_locale, target_locale)
                .with_legacy(legacy)
                .with_file_id(file_id);
            if let Some(language) = language {
                arguments = arguments.with_language(language);
            }
            for field in metadata {
                let (key, value) = field.split_once('=').ok_or_else(|| {
                    TranslationError::InvalidTranslations(format!("Metadata '{}' is not of the form KEY=VALUE", field))
                })?;
                arguments = arguments.with_metadata(key.trim(), value.trim());
            }

            let tree = convert(&input, &output, delimiters, &arguments)?;
            println!(
                "Converted {} entries: {} -> {}",
                count_leaves(&tree),
                input.display(),
                output.display()
            );
        }

        Commands::Inspect { input } => {
            let kind = FormatKind::from_path(&input)?;
            let tree = kind.load(&input, delimiters)?;

            println!("{} ({})", input.display(), kind);
            println!("{}", "=".repeat(60));
            print_tree(&tree, 0);
            println!("{}", "=".repeat(60));
            println!("Total entries: {}", count_leaves(&tree));
        }
    }
    Ok(())
}

fn print_tree(tree: &Tree, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, node) in tree {
        match node {
            Node::Scalar(value) => println!("{}{} = {:?}", indent, key, value),
            Node::Mapping(child) => {
                println!("{}{}:", indent, key);
                print_tree(child, depth + 1);
            }
        }
    }
}

fn count_leaves(tree: &Tree) -> usize {
    tree.values()
        .map(|node| match node {
            Node::Scalar(_) => 1,
            Node::Mapping(child) => count_leaves(child),
        })
        .sum()
}
