use std::env;

use interaction_verify::discord::signing::{public_key_hex, sign_request_now, signing_key_from_hex};
use interaction_verify::discord::{SIGNATURE_HEADER, TIMESTAMP_HEADER};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let secret = env::var("SIGNING_KEY").map_err(|_| "SIGNING_KEY required (hex, 32 bytes)")?;
    let url = env::var("TARGET_URL").unwrap_or_else(|_| "http://localhost:3000/interactions".into());

    let key = signing_key_from_hex(&secret)?;
    println!("Public key: {}", public_key_hex(&key));

    let body = serde_json::json!({
        "id": "787053080478613555",
        "token": "ThisIsATokenFromDiscordThatIsVeryLong",
        "type": 1,
        "version": 1
    })
    .to_string();
    let signed = sign_request_now(&key, body);

    let res = reqwest::Client::new()
        .post(&url)
        .header(SIGNATURE_HEADER, &signed.signature)
        .header(TIMESTAMP_HEADER, &signed.timestamp)
        .header("Content-Type", "application/json")
        .body(signed.body)
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;
    if status.is_success() {
        println!("✅ {} answered {} - {}", url, status, body);
    } else {
        eprintln!("❌ {} rejected the ping: {} - {}", url, status, body);
    }

    Ok(())
}
