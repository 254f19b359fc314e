//! Basic Client Example
//!
//! This example walks through a full session against a running server:
//! register, post, like, comment, and read the feed back.
//!
//! Prerequisites:
//! - A Murmur server running on localhost:4000 (`murmur serve --mem`)
//!
//! Run with:
//! ```sh
//! cargo run --example basic_client
//! ```

use murmur_sdk::{Error, MurmurClient};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let client = MurmurClient::new("http://localhost:4000");

    println!("=== Murmur SDK Basic Client Example ===\n");

    // Step 1: Health check
    println!("1. Checking server health...");
    match client.health().await {
        Ok(health) => {
            println!("   Status: {}", health.status);
            println!("   Version: {}", health.version);
        }
        Err(e) => {
            eprintln!("   Failed to connect to server: {}", e);
            eprintln!("   Make sure the Murmur server is running on localhost:4000");
            return Err(e);
        }
    }

    // Step 2: Register (or fall back to login if the account exists)
    println!("\n2. Registering an account...");
    let session = match client
        .register("Example Bot", "bot@example.com", "hunter42", "I post examples")
        .await
    {
        Ok(session) => session,
        Err(Error::Api { status: 409, .. }) => {
            println!("   Account exists, logging in instead");
            client.login("bot@example.com", "hunter42").await?
        }
        Err(e) => return Err(e),
    };
    println!("   Logged in as {} (id {})", session.user.name, session.user.id);

    let client = client.with_token(&session.token)?;

    // Step 3: Create a post
    println!("\n3. Creating a post...");
    let post = client.create_post("hello from the SDK example").await?;
    println!("   Post {} created", post.id);

    // Step 4: Like it
    println!("\n4. Toggling a like...");
    let post = client.toggle_like(post.id).await?;
    println!("   Like count: {}", post.like_count);

    // Step 5: Comment on it
    println!("\n5. Adding a comment...");
    let comment = client.add_comment(post.id, "first!").await?;
    println!("   Comment {} by {}", comment.id, comment.author.name);

    // Step 6: Read the feed back
    println!("\n6. Reading the feed...");
    for post in client.feed().await? {
        println!(
            "   [{}] {} ({} likes, {} images)",
            post.author.name,
            post.text,
            post.like_count,
            post.images.len()
        );
    }

    println!("\n=== Example completed successfully ===");
    Ok(())
}
