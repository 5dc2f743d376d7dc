//! Keygen command - prints a fresh keypair as key-exchange XML

use clap::Args;
use tracing::info;

use crate::domain::crypto::EncryptionService;
use crate::domain::keypair::GeneratedKeypair;
use crate::infrastructure::crypto::RsaEncryptionService;

#[derive(Args, Debug, Clone)]
pub struct KeygenArgs {
    /// Modulus size in bits (defaults to `auth.rsa_key_bits`)
    #[arg(long)]
    pub bits: Option<usize>,

    /// Print only the public half
    #[arg(long)]
    pub public_only: bool,
}

/// Run the keygen command
pub async fn run(args: KeygenArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let bits = args.bits.unwrap_or(config.auth.rsa_key_bits);

    let service = RsaEncryptionService::with_key_bits(bits)?;
    let keypair = service.generate_keypair().await?;
    info!(bits, "Generated keypair");

    println!("{}", render(&keypair, args.public_only));
    Ok(())
}

fn render(keypair: &GeneratedKeypair, public_only: bool) -> String {
    if public_only {
        keypair.public_key_xml.clone()
    } else {
        format!("{}\n{}", keypair.public_key_xml, keypair.private_key_xml)
    }
}
