// Build script: expose METRICREPORT_VERSION for `--version`
//
// Tagged builds report the tag version ("v0.2.0" -> "0.2.0"); anything else
// reports the package version with the `git describe` suffix appended.
// Without git the package version is used unchanged.

use std::process::Command;

fn main() {
    let package = env!("CARGO_PKG_VERSION");
    let version = git_describe()
        .map(|described| version_from_describe(package, &described))
        .unwrap_or_else(|| package.to_string());

    println!("cargo:rustc-env=METRICREPORT_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string())
}

fn version_from_describe(package: &str, described: &str) -> String {
    match described.strip_prefix('v') {
        // "v0.2.0" or "v0.2.0-3-gabc123-dirty" both report the tag
        Some(tagged) => tagged.split('-').next().unwrap_or(tagged).to_string(),
        None => format!("{}-{}", package, described),
    }
}
