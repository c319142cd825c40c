//! Statistics Dashboard Demo
//!
//! Records some activity against a running statistics server and prints the
//! dashboard views built from it.
//!
//! Usage:
//!   1. Start the server: REDIS_URL=memory:// cargo run --release
//!   2. Run this demo:    cargo run --example stats_dashboard --release

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

use serde_json::Value;

struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        Ok(Client {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
        })
    }

    /// Send several inline commands in one write and collect the replies
    fn pipeline(&mut self, commands: &[&str]) -> std::io::Result<Vec<Value>> {
        let mut batch = String::new();
        for cmd in commands {
            batch.push_str(cmd);
            batch.push_str("\r\n");
        }
        self.writer.write_all(batch.as_bytes())?;
        self.writer.flush()?;

        let mut replies = Vec::with_capacity(commands.len());
        for _ in commands {
            let mut line = String::new();
            self.reader.read_line(&mut line)?;
            replies.push(serde_json::from_str(&line).unwrap_or(Value::Null));
        }
        Ok(replies)
    }

    fn query(&mut self, command: &str) -> std::io::Result<Value> {
        Ok(self.pipeline(&[command])?.remove(0))
    }
}

fn main() -> std::io::Result<()> {
    println!("Platform Statistics Dashboard");
    println!("=============================");
    println!();

    let addr = std::env::var("STATS_ADDR").unwrap_or_else(|_| "127.0.0.1:8012".to_string());
    println!("Connecting to statistics server at {}...", addr);

    let mut client = match Client::connect(&addr) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to connect: {}", e);
            eprintln!("Make sure the server is running:");
            eprintln!("  REDIS_URL=memory:// cargo run --release");
            return Ok(());
        }
    };
    println!("Connected!\n");

    println!("=== Recording Activity ===");
    let activity = [
        "INCR total_users 3",
        "INCR total_messages 12",
        "INCRREGION CAI users 40",
        "INCRREGION CAI complaints 6",
        "INCRREGION CAI messages 90",
        "INCRREGION ALX users 25",
        "INCRREGION ALX messages 80",
        "INCRREGION ASW users 4",
        "INCRREGION ASW complaints 9",
        "INCRORG مستقل candidates 30",
        "INCRORG مستقل members 12",
        "RATE مستقل 5",
        "RATE مستقل 4",
    ];
    let replies = client.pipeline(&activity)?;
    let failed = replies.iter().filter(|r| r.get("error").is_some()).count();
    println!("  Sent {} commands ({} failed)", activity.len(), failed);
    println!();

    println!("=== Summary ===");
    let summary = client.query("SUMMARY")?;
    println!("  Users:              {}", summary["total_users"]);
    println!("  Complaints:         {}", summary["total_complaints"]);
    println!("  Resolution rate:    {}%", summary["complaint_resolution_rate"]);
    println!("  Engagement score:   {}", summary["user_engagement_score"]);
    println!("  Active candidates:  {}", summary["active_candidates"]);
    println!();

    println!("=== Most Active Regions ===");
    let regions = client.query("REGIONS RANKED")?;
    for region in regions.as_array().into_iter().flatten().take(5) {
        println!(
            "  {:<4} {:<12} users={:<4} activity={}",
            region["region_code"].as_str().unwrap_or("?"),
            region["region_name"].as_str().unwrap_or("?"),
            region["users_count"],
            region["activity_score"]
        );
    }
    println!();

    println!("=== Top Organizations ===");
    let top = client.query("TOPORGS 5")?;
    for org in top.as_array().into_iter().flatten() {
        println!(
            "  {:<40} representation={:<4} rating={} ({})",
            org["organization_name"].as_str().unwrap_or("?"),
            org["total_representation"],
            org["ratings_average"],
            org["rating_category"].as_str().unwrap_or("?")
        );
    }
    println!();

    println!("=== Error Handling ===");
    let missing = client.query("REGION ZZZ")?;
    println!("  REGION ZZZ -> {} ({})", missing["error"], missing["kind"]);
    let reset = client.query("RESET")?;
    println!("  RESET      -> {}", reset);

    println!("\nDashboard demo complete!");
    Ok(())
}
