use clap::{Parser, Subcommand};
use futures::stream::StreamExt;
use s3client::{Config, ObjectStoreClient, PAGE_CAP, content_md5, upload_stream_from};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

/// s3client: command line access to an S3-compatible object store
#[derive(Parser, Debug)]
#[command(name = "s3client")]
#[command(about = "List, fetch, upload and delete objects in an S3-compatible store", long_about = None)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(short, long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Store hostname, optionally with a port (e.g. s3.amazonaws.com, localhost:9000)
    #[arg(long, env = "S3_HOSTNAME")]
    hostname: Option<String>,

    /// Region used for request signing
    #[arg(long, env = "S3_REGION")]
    region: Option<String>,

    /// Access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    access_key_id: Option<String>,

    /// Secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,

    /// Use plain HTTP instead of HTTPS; `--insecure=false` overrides a config file
    #[arg(
        long,
        env = "S3_INSECURE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    insecure: Option<bool>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all buckets
    Buckets,
    /// List keys in a bucket
    Ls {
        bucket: String,
        /// Start listing at this key (inclusive)
        #[arg(long, default_value = "")]
        start_at: String,
        /// Maximum number of keys to list
        #[arg(long, default_value_t = PAGE_CAP as i32)]
        max_keys: i32,
    },
    /// Print the size of an object
    Stat { bucket: String, key: String },
    /// Download an object to a file or stdout
    Get {
        bucket: String,
        key: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a file
    Put {
        bucket: String,
        key: String,
        file: PathBuf,
        /// Do not send a Content-MD5 checksum
        #[arg(long)]
        no_md5: bool,
    },
    /// Delete an object
    Rm { bucket: String, key: String },
}

/// Exit status for a missing bucket or key
const EXIT_NOT_FOUND: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so `get` can stream object data to stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(cfg) => {
                tracing::info!("Loaded configuration from {}", path.display());
                cfg
            }
            Err(e) => {
                tracing::error!("Failed to load config file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let config = file_config.merge(Config {
        hostname: cli.hostname.clone(),
        region: cli.region.clone(),
        access_key_id: cli.access_key_id.clone(),
        secret_access_key: cli.secret_access_key.clone(),
        insecure: cli.insecure,
    });

    let client = match config.build_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    client: &ObjectStoreClient,
    command: Command,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Command::Buckets => {
            for bucket in client.list_all_buckets().await? {
                println!("{}\t{}", bucket.creation_date, bucket.name);
            }
        }
        Command::Ls {
            bucket,
            start_at,
            max_keys,
        } => {
            let items = client.list_objects(&bucket, &start_at, max_keys).await?;
            for item in &items {
                println!("{:>12}\t{}", item.size, item.key);
            }
            if items.len() == max_keys as usize
                && let Some(last) = items.last()
            {
                tracing::info!(
                    "Listed {} keys; there may be more, continue with --start-at {:?}",
                    items.len(),
                    last.key
                );
            }
        }
        Command::Stat { bucket, key } => match client.stat_object(&bucket, &key).await? {
            Some(size) => println!("{}", size),
            None => return Ok(not_found(&bucket, &key)),
        },
        Command::Get {
            bucket,
            key,
            output,
        } => {
            let Some(mut download) = client.get_object(&bucket, &key).await? else {
                return Ok(not_found(&bucket, &key));
            };
            let mut writer: Box<dyn tokio::io::AsyncWrite + Unpin> = match &output {
                Some(path) => Box::new(tokio::fs::File::create(path).await?),
                None => Box::new(tokio::io::stdout()),
            };
            let mut written: u64 = 0;
            while let Some(chunk) = download.body.next().await {
                let chunk = chunk?;
                writer.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            writer.flush().await?;
            tracing::info!("Downloaded {} bytes from {}/{}", written, bucket, key);
        }
        Command::Put {
            bucket,
            key,
            file,
            no_md5,
        } => {
            let data = tokio::fs::read(&file).await?;
            let size = data.len() as u64;
            let digest = (!no_md5).then(|| content_md5(&data));
            client
                .put_object(
                    &bucket,
                    &key,
                    size,
                    digest.as_ref().map(|d| d.as_slice()),
                    upload_stream_from(data),
                )
                .await?;
            tracing::info!("Uploaded {} bytes to {}/{}", size, bucket, key);
        }
        Command::Rm { bucket, key } => {
            client.delete_object(&bucket, &key).await?;
            tracing::info!("Deleted {}/{}", bucket, key);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn not_found(bucket: &str, key: &str) -> ExitCode {
    eprintln!("{}/{}: not found", bucket, key);
    ExitCode::from(EXIT_NOT_FOUND)
}
