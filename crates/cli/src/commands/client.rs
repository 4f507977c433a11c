//! Client commands - upload, download and list against a running server.

use std::path::PathBuf;

use eyre::{Result, WrapErr};
use stash_client::FileClient;
use tracing::{debug, info};

use crate::args::{ClientArgs, DownloadArgs, ListArgs, UploadArgs};

async fn connect(args: &ClientArgs) -> Result<FileClient> {
    debug!(addr = %args.addr, "Connecting");
    FileClient::connect(args.addr.clone())
        .await
        .wrap_err_with(|| format!("failed to connect to {}", args.addr))
}

/// Upload a local file under its base name and print the server's reply.
pub async fn upload(args: UploadArgs) -> Result<()> {
    let client = connect(&args.client).await?.with_chunk_size(args.chunk_size);

    let response = client
        .upload_file(&args.file)
        .await
        .wrap_err_with(|| format!("failed to upload {}", args.file.display()))?;

    println!("{}", response.message);
    Ok(())
}

/// Download a stored file into `--output`, or into the working directory.
pub async fn download(args: DownloadArgs) -> Result<()> {
    let client = connect(&args.client).await?;
    let dest = args.output.unwrap_or_else(|| PathBuf::from(&args.name));

    let written = client
        .download_file(&args.name, &dest)
        .await
        .wrap_err_with(|| format!("failed to download {:?}", args.name))?;

    info!(name = %args.name, bytes = written, "Download complete");
    println!("Downloaded {} ({written} bytes) to {}", args.name, dest.display());
    Ok(())
}

/// Print one `name | created | updated` line per stored file.
pub async fn list(args: ListArgs) -> Result<()> {
    let client = connect(&args.client).await?;

    let files = client.list().await.wrap_err("failed to list files")?;
    if files.is_empty() {
        info!("No files stored");
    }
    for file in files {
        println!("{} | {} | {}", file.filename, file.created_at, file.updated_at);
    }
    Ok(())
}
