//! Basic usage example - store, retrieve, and conflict on the shared registry

use objreg_core::{Identified, ObjectRegistry, Result};
use std::sync::Arc;

struct User {
    id: u64,
    name: String,
}

impl User {
    fn new(id: u64, name: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: name.into(),
        })
    }
}

impl Identified for User {
    fn object_id(&self) -> String {
        self.id.to_string()
    }
}

fn main() -> Result<()> {
    let registry = ObjectRegistry::global();

    let alice = User::new(1, "Alice");
    registry.store(&alice)?;
    println!("Stored user 1: {}", alice.name);

    let bob = User::new(2, "Bob");
    registry.store(&bob)?;
    println!("Stored user 2: {}", bob.name);

    print!("Does user 1 exist in the registry? ");
    if registry.exists::<User>("1") {
        println!("Yes");
    } else {
        println!("No");
    }

    // Retrieval hands back the same instance, not a copy
    let found = registry.get::<User>("1")?;
    println!(
        "Found user 1: {} (same instance: {})",
        found.name,
        Arc::ptr_eq(&found, &alice)
    );

    // Show internal state
    print!("{}", registry.dump());

    // A fresh instance reusing an occupied id is rejected; this is the
    // registry doing its job, not a bug.
    let charlie = User::new(1, "Charlie");
    match registry.store(&charlie) {
        Ok(()) => println!("Unexpected: duplicate id accepted"),
        Err(err) => println!("Rejected as expected: {}", err),
    }

    Ok(())
}
