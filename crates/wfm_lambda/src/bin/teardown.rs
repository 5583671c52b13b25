use lambda_runtime::Error;
use wfm_lambda::adapters::aws::AwsTeardownClient;
use wfm_lambda::handlers::cleanup::{run_cleanup, CleanupManifest};

/// Deletes every resource named in a manifest file.
///
/// Usage: teardown [manifest-path] [aws-profile]
#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);
    let manifest_path = args.next().unwrap_or_else(|| "delete_file.json".to_string());
    let profile = args.next();

    let contents = std::fs::read_to_string(&manifest_path)
        .map_err(|error| Error::from(format!("cannot read {manifest_path}: {error}")))?;
    let manifest: CleanupManifest = serde_json::from_str(&contents)
        .map_err(|error| Error::from(format!("invalid manifest {manifest_path}: {error}")))?;

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    let aws_config = loader.load().await;
    let client = AwsTeardownClient::new(&aws_config);

    let report = run_cleanup(&client, &manifest);
    println!(
        "teardown finished: {} deleted, {} failed",
        report.deleted, report.failed
    );
    if report.failed > 0 {
        return Err(Error::from("some resources could not be deleted"));
    }
    Ok(())
}
