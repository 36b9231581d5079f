use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dircache::areas::repository::Repository;
use dircache::config::Config;
use std::io::Read;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "dircache",
    version = "0.1.0",
    about = "A content-addressed object store with a staging cache",
    long_about = "Stores file snapshots as compressed, SHA-1 addressed objects, \
    stages working tree files in a checksummed index, and records the index \
    as tree and commit objects.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short, long, global = true, help = "Log storage operations to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init-db",
        about = "Create an empty object store",
        long_about = "This command creates the storage root and its object store, \
        including all 256 shard directories."
    )]
    InitDb,
    #[command(
        name = "update-cache",
        about = "Stage files in the index",
        long_about = "This command writes the content of each file to the object store \
        and records it in the index together with its filesystem metadata."
    )]
    UpdateCache {
        #[arg(index = 1, required = true, help = "The files to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "write-tree",
        about = "Create a tree object from the index",
        long_about = "This command records every staged entry in a tree object and prints its id."
    )]
    WriteTree,
    #[command(
        name = "read-tree",
        about = "List the records of a tree object"
    )]
    ReadTree {
        #[arg(index = 1, help = "The tree id")]
        tree: String,
    },
    #[command(
        name = "commit-tree",
        about = "Create a commit object for a tree",
        long_about = "This command records a tree as a commit with the given parents. \
        The commit message is read from standard input."
    )]
    CommitTree {
        #[arg(index = 1, help = "The tree id")]
        tree: String,
        #[arg(short = 'p', long = "parent", help = "A parent commit id")]
        parents: Vec<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the type and size of an object"
    )]
    CatFile {
        #[arg(short = 'p', long, help = "Also print the object content")]
        pretty: bool,
        #[arg(index = 1, help = "The object id")]
        object: String,
    },
    #[command(
        name = "show-diff",
        about = "Compare staged files with the working tree"
    )]
    ShowDiff,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .init();

    let pwd = std::env::current_dir()?;
    let config = Config::from_env(&pwd)?;
    let mut repository = Repository::new(config, Box::new(std::io::stdout()));

    match &cli.command {
        Commands::InitDb => repository.init_db()?,
        Commands::UpdateCache { paths } => repository.update_cache(paths)?,
        Commands::WriteTree => repository.write_tree()?,
        Commands::ReadTree { tree } => repository.read_tree(tree)?,
        Commands::CommitTree { tree, parents } => {
            let mut message = Vec::new();
            std::io::stdin()
                .read_to_end(&mut message)
                .context("unable to read the commit message from stdin")?;

            repository.commit_tree(tree, parents, message.into())?
        }
        Commands::CatFile { pretty, object } => repository.cat_file(object, *pretty)?,
        Commands::ShowDiff => repository.show_diff()?,
    }

    Ok(())
}
