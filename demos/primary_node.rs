//! Primary node with in-process secondaries
//!
//! Run with: cargo run --example primary_node [PORT] [SECONDARIES]
//!
//! Examples:
//!   cargo run --example primary_node              # port 2002, 3 secondaries
//!   cargo run --example primary_node 9999 5       # port 9999, 5 secondaries
//!
//! Each secondary is a plain thread that reads commands and answers every
//! one of them with a short text reply. The primary broadcasts a map load,
//! round-robins a few token requests, then targets one secondary directly.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use multigpu_router::{
    CommandHeader, CommandId, PrimaryCommands, Router, RouterConfig, RouterServer,
};
use tracing_subscriber::EnvFilter;

fn run_secondary(port: u16, name: String) -> std::io::Result<()> {
    let mut stream = TcpStream::connect(("127.0.0.1", port))?;
    loop {
        let mut header = [0u8; CommandHeader::SIZE];
        stream.read_exact(&mut header)?;
        let Some(header) = CommandHeader::decode(&header) else {
            return Ok(());
        };
        let mut payload = vec![0u8; header.size as usize];
        stream.read_exact(&mut payload)?;

        // Broadcast commands expect no answer.
        if matches!(header.id, CommandId::SendFrame | CommandId::LoadMap) {
            println!("[{}] {:?} ({} bytes)", name, header.id, payload.len());
            continue;
        }

        let reply = format!("{}:{:?}", name, header.id);
        stream.write_all(&(reply.len() as u32).to_le_bytes())?;
        stream.write_all(reply.as_bytes())?;
    }
}

fn main() -> multigpu_router::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let port: u16 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2002);
    let secondaries: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    let connected = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connected);
    let router = Arc::new(Router::with_observer(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        println!("Secondary connected ({} so far)", n);
    }));

    let server = RouterServer::start_with_router(RouterConfig::with_port(port), router)?;
    let commands = PrimaryCommands::new(Arc::clone(server.router()));

    for i in 0..secondaries {
        let name = format!("secondary-{}", i);
        std::thread::spawn(move || {
            if let Err(e) = run_secondary(port, name.clone()) {
                println!("[{}] disconnected: {}", name, e);
            }
        });
        // Keep registration order equal to spawn order.
        while server.router().session_count() < i + 1 {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    println!("Load map on {} secondaries", commands.send_load_map("Town10HD"));

    for stream_id in 0..secondaries as u32 + 1 {
        let reply = commands.get_token(stream_id);
        match server
            .pool()
            .block_on_timeout(Duration::from_secs(1), reply)?
        {
            Some(info) => println!(
                "Token {} from session {}: {}",
                stream_id,
                info.session.id(),
                String::from_utf8_lossy(&info.payload)
            ),
            None => println!("Token {}: no reply", stream_id),
        }
    }

    let target = commands.next_target();
    let reply = commands.is_enabled_ros(&target, 1);
    if let Some(info) = server
        .pool()
        .block_on_timeout(Duration::from_secs(1), reply)?
    {
        println!("ROS state: {}", String::from_utf8_lossy(&info.payload));
    }

    server.shutdown();
    Ok(())
}
