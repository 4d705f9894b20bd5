/* tests/full_tests.rs */

#![cfg(feature = "full")]

use std::time::Duration;

use confreload::engine::ReloadEvent;
use confreload::{AnyFormat, ConfError, Engine, MemorySource, Options};
use futures_util::StreamExt;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
struct Http {
	#[validate(range(min = 1024))]
	port: u16,
	#[validate(length(min = 1))]
	host: String,
}

#[tokio::test]
async fn test_decode_validated() {
	let source = MemorySource::new(
		AnyFormat::Yaml,
		"server:\n  http:\n    port: 8080\n    host: 0.0.0.0\n  admin:\n    port: 80\n    host: ''\n",
	);
	let engine = Engine::load(source, Options::default()).await.unwrap();

	let http: Http = engine.decode_validated("server.http").unwrap();
	assert_eq!(http.port, 8080);

	let admin = engine.decode_validated::<Http>("server.admin");
	assert!(matches!(admin, Err(ConfError::Validation(_))));
}

#[tokio::test]
async fn test_event_stream() {
	let source = MemorySource::new(AnyFormat::Toml, "port = 1\n");
	let engine = Engine::load(source, Options::default()).await.unwrap();
	let mut stream = engine.event_stream();

	engine.source().set("port = 2\n");
	let event = tokio::time::timeout(Duration::from_secs(5), stream.next())
		.await
		.unwrap()
		.unwrap()
		.unwrap();
	assert_eq!(event, ReloadEvent::Reloaded { generation: 2 });
	assert_eq!(engine.get_int("port"), 2);
}
