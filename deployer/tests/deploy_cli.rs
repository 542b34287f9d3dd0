use std::{fs, path::Path, process::Output};

use alloy::{
    node_bindings::{Anvil, AnvilInstance},
    primitives::{Address, address},
    providers::{Provider, ProviderBuilder},
};
use assert_cmd::Command;
use deployer_config::DeployConfig;
use tempfile::TempDir;

const MNEMONIC: &str = "test test test test test test test test test test test junk";
const DEPLOYER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

fn fixtures() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/artifacts"))
}

/// Write a config for `anvil` into a fresh directory.
fn setup(anvil: &AnvilInstance, contract: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let config = format!(
        r#"# local deployment
[wallet]
mnemonic = "{MNEMONIC}"

[network]
rpc-url = "{}"
chain-id = {}

[contract]
name = "{contract}"
artifacts = '{}'
"#,
        anvil.endpoint_url(),
        anvil.chain_id(),
        fixtures().display()
    );
    fs::write(dir.path().join("deploy.toml"), config).unwrap();
    dir
}

fn deploy(dir: &TempDir, extra: &[&str]) -> Output {
    Command::cargo_bin("deploy")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("DEPLOYER_RPC_URL")
        .env_remove("DEPLOYER_MNEMONIC")
        .env_remove("DEPLOYER_ACCOUNT_INDEX")
        .env_remove("DEPLOYER_PRIVATE_KEY")
        .env("NO_COLOR", "1")
        .args(extra)
        .output()
        .unwrap()
}

fn stdout_value<'a>(out: &'a str, label: &str) -> Option<&'a str> {
    out.lines().find_map(|l| l.strip_prefix(label))
}

#[tokio::test]
async fn deploys_and_reports() {
    let anvil = Anvil::new().spawn();
    let provider = ProviderBuilder::new().connect_http(anvil.endpoint_url());
    let balance = provider.get_balance(DEPLOYER).await.unwrap();

    let dir = setup(&anvil, "ERC1155BUILDER");
    let out = deploy(&dir, &[]);
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    assert_eq!(
        stdout_value(&stdout, "Deploying contracts with the account: "),
        Some(DEPLOYER.to_string().as_str())
    );
    assert_eq!(
        stdout_value(&stdout, "Account balance: "),
        Some(balance.to_string().as_str())
    );

    let printed: Address = stdout_value(&stdout, "Contract address: ")
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(printed, DEPLOYER.create(0));
    assert!(!provider.get_code_at(printed).await.unwrap().is_empty());

    // the address is recorded and the rest of the file is preserved
    let path = dir.path().join("deploy.toml");
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("# local deployment"));
    let cfg = DeployConfig::read(&path).await.unwrap();
    assert_eq!(cfg.deployment("ERC1155BUILDER"), Some(printed));
}

#[tokio::test]
async fn constructor_args_from_command_line() {
    let anvil = Anvil::new().spawn();
    let dir = setup(&anvil, "Token");

    let out = deploy(
        &dir,
        &[
            "--arg",
            "1000",
            "--arg",
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
            "--no-save",
        ],
    );
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout_value(&stdout, "Contract address: ").is_some());

    let cfg = DeployConfig::read(dir.path().join("deploy.toml"))
        .await
        .unwrap();
    assert!(cfg.deployments.is_empty());
}

#[tokio::test]
async fn unknown_contract_fails() {
    let anvil = Anvil::new().spawn();
    let dir = setup(&anvil, "Nope");

    let out = deploy(&dir, &[]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Failed to load contract Nope"), "{stderr}");

    // account details are printed before the failure, no contract address after it
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout_value(&stdout, "Account balance: ").is_some());
    assert!(stdout_value(&stdout, "Contract address: ").is_none());
}

#[tokio::test]
async fn wrong_argument_count_fails() {
    let anvil = Anvil::new().spawn();
    let dir = setup(&anvil, "Token");

    let out = deploy(&dir, &["--arg", "1"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("constructor takes 2 arguments, got 1"), "{stderr}");
}

#[tokio::test]
async fn chain_id_mismatch_fails() {
    let anvil = Anvil::new().spawn();
    let dir = setup(&anvil, "ERC1155BUILDER");
    let path = dir.path().join("deploy.toml");
    let raw = fs::read_to_string(&path).unwrap().replace(
        &format!("chain-id = {}", anvil.chain_id()),
        "chain-id = 1",
    );
    fs::write(&path, raw).unwrap();

    let out = deploy(&dir, &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("expected chain 1"), "{stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = deploy(&dir, &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("Failed to read config file"), "{stderr}");
}

#[test]
fn missing_signer_fails() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("deploy.toml"),
        "[network]\nrpc-url = \"http://127.0.0.1:1\"\n",
    )
    .unwrap();
    let out = deploy(&dir, &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("No signer configured"), "{stderr}");
}

#[tokio::test]
async fn account_index_flag_selects_signer() {
    let anvil = Anvil::new().spawn();
    let dir = setup(&anvil, "ERC1155BUILDER");
    let second = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    let out = deploy(&dir, &["--account-index", "1", "--no-save"]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(
        stdout_value(&stdout, "Deploying contracts with the account: "),
        Some(second.to_string().as_str())
    );
    let printed: Address = stdout_value(&stdout, "Contract address: ")
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(printed, second.create(0));
}

#[tokio::test]
async fn unwritable_config_still_succeeds() {
    let anvil = Anvil::new().spawn();
    let dir = setup(&anvil, "ERC1155BUILDER");
    let path = dir.path().join("deploy.toml");
    let before = fs::read_to_string(&path).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(&path, perms).unwrap();
    if fs::OpenOptions::new().write(true).open(&path).is_ok() {
        // privileged users ignore file permissions
        return;
    }

    let out = deploy(&dir, &[]);
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert_eq!(out.status.code(), Some(0), "{stderr}");
    assert!(stderr.contains("Failed to write updated config file"), "{stderr}");

    let stdout = String::from_utf8(out.stdout).unwrap();
    let printed: Address = stdout_value(&stdout, "Contract address: ")
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(printed, DEPLOYER.create(0));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}
