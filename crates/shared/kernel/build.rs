fn main() {
    let commit = std::env::var("TOGGLES_BUILD_COMMIT")
        .or_else(|_| std::env::var("GIT_COMMIT"))
        .unwrap_or_else(|_| "unknown".to_owned());
    let build_time = std::env::var("TOGGLES_BUILD_TIME")
        .or_else(|_| std::env::var("SOURCE_DATE_EPOCH"))
        .unwrap_or_else(|_| "unknown".to_owned());

    println!("cargo:rustc-env=TOGGLES_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=TOGGLES_BUILD_TIME={build_time}");

    println!("cargo:rerun-if-env-changed=TOGGLES_BUILD_COMMIT");
    println!("cargo:rerun-if-env-changed=GIT_COMMIT");
    println!("cargo:rerun-if-env-changed=TOGGLES_BUILD_TIME");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
