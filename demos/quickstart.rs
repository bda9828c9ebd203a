//! Quick-start examples for the UlazAI Rust SDK.
//!
//! Run with:
//!   ULAZAI_API_KEY=ulz_live_... cargo run --example quickstart
//!
//! Or pass the key directly in code (not recommended for production).

use std::time::Duration;

use serde_json::json;
use ulazai::{ClientBuilder, ImageRequest, UlazAiError, VideoRequest, WaitOptions};

#[tokio::main]
async fn main() -> ulazai::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Create a client (reads ULAZAI_API_KEY from environment)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new().build()?;

    // Or provide the key directly:
    // let client = ulazai::Client::new("ulz_live_abc123")?;

    // -----------------------------------------------------------------------
    // 2. Discover models
    // -----------------------------------------------------------------------
    let image_models = client.list_image_models().await?;
    println!("Image models: {image_models}");
    let video_models = client.list_video_models().await?;
    println!("Video models: {video_models}");
    println!();

    // -----------------------------------------------------------------------
    // 3. Generate an image and wait for it
    // -----------------------------------------------------------------------
    let created = client
        .generate_image(
            &ImageRequest::new("A cozy reading nook, warm light, film grain", "nano-banana-pro")
                .size("4:5")
                .quality("high")
                .google_search(false),
        )
        .await?;

    let generation_id = created["generation_id"]
        .as_str()
        .or_else(|| created["id"].as_str())
        .unwrap_or_default()
        .to_string();
    println!("Started image generation {generation_id}");

    let opts = WaitOptions::image().on_progress(|payload| {
        println!("  status: {}", ulazai::image_status(payload));
    });
    let image = client.wait_for_image(&generation_id, Some(opts)).await?;
    println!("Image finished as {}", ulazai::image_status(&image));
    println!();

    // -----------------------------------------------------------------------
    // 4. Generate a video, handling a timeout separately
    // -----------------------------------------------------------------------
    let job = client
        .generate_video(
            &VideoRequest::new("veo-3-fast", "Slow dolly shot through a rainy night market")
                .aspect_ratio("16:9")
                .duration_seconds(8)
                .extra("generate_audio", true),
        )
        .await?;

    let job_id = job["job"]["id"].as_str().unwrap_or_default().to_string();
    let opts = WaitOptions::video().poll_interval(Duration::from_secs(5));

    match client.wait_for_video(&job_id, Some(opts)).await {
        Ok(done) => println!("Video {job_id} finished as {}", ulazai::video_status(&done)),
        Err(UlazAiError::Timeout { timeout, .. }) => {
            println!("Video {job_id} still running after {timeout:?}, check history later");
        }
        Err(e) => return Err(e),
    }
    println!();

    // -----------------------------------------------------------------------
    // 5. Video studio tools take their payload as-is
    // -----------------------------------------------------------------------
    let interview = client
        .generate_street_interview(&json!({
            "topic": "What is your favorite street food?",
            "language": "en",
        }))
        .await?;
    println!("Street interview: {interview}");
    println!();

    // -----------------------------------------------------------------------
    // 6. Browse history
    // -----------------------------------------------------------------------
    let images = client.list_image_history(Some(1), Some(10)).await?;
    println!("Recent images: {images}");
    let videos = client.list_video_history(Some(5)).await?;
    println!("Recent videos: {videos}");

    Ok(())
}
