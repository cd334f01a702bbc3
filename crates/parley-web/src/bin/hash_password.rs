//! Prints an Argon2 hash for a `[[users]]` entry in the server config.

use std::io::{self, Write};

use parley_core::{Argon2Hasher, CredentialHasher};

fn main() -> anyhow::Result<()> {
    eprint!("Enter password: ");
    io::stderr().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim();

    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = Argon2Hasher.hash(password)?;
    println!("{hash}");
    Ok(())
}
