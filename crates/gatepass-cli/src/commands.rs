use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use gatepass_core::VerificationService;
use gatepass_crypto::{CanonicalHasher, RedemptionTokenCodec, SignatureService};
use gatepass_server::{GatepassServer, ServerConfig};
use gatepass_types::{OwnerId, SignedReceipt};
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Verify(args) => cmd_verify(args, &cli.format),
        Command::Digest(args) => cmd_digest(args, &cli.format),
        Command::Token(args) => cmd_token(args, &cli.format),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    tracing::debug!(bind_addr = %config.bind_addr, "starting server");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(GatepassServer::new(config).serve())?;
    Ok(())
}

fn cmd_verify(args: VerifyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let data = read_json(&args.data)?;
    let receipt = match (&args.receipt, &args.public_key, &args.signature) {
        (Some(path), _, _) => serde_json::from_value::<SignedReceipt>(read_json(path)?)
            .with_context(|| format!("{} is not a receipt", path.display()))?,
        (None, Some(key), Some(signature)) => SignedReceipt {
            public_key: std::fs::read_to_string(key)
                .with_context(|| format!("reading {}", key.display()))?,
            digital_signature: signature.clone(),
        },
        _ => bail!("pass either --receipt or both --public-key and --signature"),
    };

    let verifier = VerificationService::new(SignatureService::default());
    let verified = verifier.check(&data, &receipt.public_key, &receipt.digital_signature)?;

    match format {
        OutputFormat::Json => println!("{}", json!({ "isVerified": verified })),
        OutputFormat::Text if verified => {
            println!("{} Receipt verified", "✓".green().bold());
            println!("  Digest: {}", CanonicalHasher::digest(&data)?.to_hex().cyan());
        }
        OutputFormat::Text => {
            println!("{} Signature does not match this order data", "✗".red().bold());
        }
    }
    if !verified {
        bail!("receipt did not verify");
    }
    Ok(())
}

fn cmd_digest(args: DigestArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let data = read_json(&args.data)?;
    let digest = CanonicalHasher::digest(&data)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "digest": digest.to_hex() })),
        OutputFormat::Text => println!("{}", digest.to_hex()),
    }
    Ok(())
}

fn cmd_token(args: TokenArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let owner = OwnerId::new(args.owner);
    let token = RedemptionTokenCodec::derive(&owner, &args.pin);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "ownerId": owner.as_str(), "redemptionToken": token.as_str() })
        ),
        OutputFormat::Text => println!("{}", token.as_str()),
    }
    Ok(())
}

/// Read a JSON document from `path`, or stdin when `path` is `-`.
fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_json_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.json");
        std::fs::write(&path, r#"[{"ownerId":"u1","quantity":1}]"#).unwrap();
        let value = read_json(&path).unwrap();
        assert_eq!(value[0]["ownerId"], "u1");
    }

    #[test]
    fn read_json_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(read_json(&path).is_err());
    }

    #[test]
    fn verify_requires_key_material() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.json");
        std::fs::write(&path, "[]").unwrap();
        let args = VerifyArgs {
            data: path,
            receipt: None,
            public_key: None,
            signature: None,
        };
        assert!(cmd_verify(args, &OutputFormat::Text).is_err());
    }

    #[test]
    fn token_and_digest_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"b":1,"a":2}"#).unwrap();
        cmd_digest(DigestArgs { data: path }, &OutputFormat::Json).unwrap();
        cmd_token(
            TokenArgs { owner: "u1".into(), pin: "1234".into() },
            &OutputFormat::Text,
        )
        .unwrap();
    }

    #[test]
    fn verify_accepts_real_receipt_and_rejects_tampered_data() {
        use gatepass_crypto::SigningKeypair;

        let dir = tempfile::tempdir().unwrap();
        let data = json!([{"ticketGroupId": "g1", "itemType": "ga", "quantity": 2, "ownerId": "u1"}]);
        let keypair = SigningKeypair::generate().unwrap();
        let signature = keypair
            .sign(&CanonicalHasher::digest(&data).unwrap())
            .unwrap()
            .to_base64();
        let receipt = SignedReceipt {
            public_key: keypair.public_key_pem().to_owned(),
            digital_signature: signature.clone(),
        };

        let data_path = dir.path().join("order.json");
        let receipt_path = dir.path().join("receipt.json");
        let key_path = dir.path().join("key.pem");
        std::fs::write(&data_path, data.to_string()).unwrap();
        std::fs::write(&receipt_path, serde_json::to_string(&receipt).unwrap()).unwrap();
        std::fs::write(&key_path, keypair.public_key_pem()).unwrap();

        let from_receipt = VerifyArgs {
            data: data_path.clone(),
            receipt: Some(receipt_path),
            public_key: None,
            signature: None,
        };
        cmd_verify(from_receipt, &OutputFormat::Json).unwrap();

        let from_key = VerifyArgs {
            data: data_path,
            receipt: None,
            public_key: Some(key_path.clone()),
            signature: Some(signature.clone()),
        };
        cmd_verify(from_key, &OutputFormat::Text).unwrap();

        let tampered_path = dir.path().join("tampered.json");
        let mut tampered = data.clone();
        tampered[0]["quantity"] = json!(3);
        std::fs::write(&tampered_path, tampered.to_string()).unwrap();
        let tampered_args = VerifyArgs {
            data: tampered_path,
            receipt: None,
            public_key: Some(key_path),
            signature: Some(signature),
        };
        let err = cmd_verify(tampered_args, &OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("did not verify"));
    }
}
