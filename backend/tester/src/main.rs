use anyhow::{Result, bail};
use clap::Parser;
use reqwest::Client;
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(default_value = "http://127.0.0.1:8000")]
    base_url: String,

    #[arg(long, default_value = "Osprey")]
    species: String,

    #[arg(long, default_value_t = -63.5752, allow_negative_numbers = true)]
    lon: f64,

    #[arg(long, default_value_t = 44.6488, allow_negative_numbers = true)]
    lat: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = Client::new();
    let sightings_url = format!("{}/api/sightings/", args.base_url.trim_end_matches('/'));

    let payload = json!({ "lon": args.lon, "lat": args.lat, "species": args.species });
    let response = client.post(&sightings_url).json(&payload).send().await?;

    println!("POST {sightings_url}: {}", response.status());
    if !response.status().is_success() {
        bail!("create failed: {}", response.text().await?);
    }

    let created: Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&created)?);

    let collection: Value = client.get(&sightings_url).send().await?.json().await?;
    let features = collection["features"].as_array().map_or(0, Vec::len);

    println!("GET {sightings_url}: {features} features");
    if !collection["features"]
        .as_array()
        .is_some_and(|features| features.iter().any(|f| f["id"] == created["id"]))
    {
        bail!("created sighting {} missing from list", created["id"]);
    }

    Ok(())
}
