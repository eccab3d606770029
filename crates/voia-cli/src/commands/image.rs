use crate::cli::ImageCommands;
use crate::commands::common::{deletion_client, load_client_config, upload_file, uploader};
use crate::error::CliError;

pub async fn run_image(command: ImageCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let (profile_name, config) = load_client_config(global_profile)?;
    match command {
        ImageCommands::Upload { path } => {
            let uploader = uploader(&profile_name, &config)?;
            let url = upload_file(&uploader, &path).await?;
            println!("{url}");
        }
        ImageCommands::Delete { url } => {
            deletion_client(&profile_name, &config)?.delete(&url).await?;
            println!("Deleted {url}");
        }
    }
    Ok(())
}
