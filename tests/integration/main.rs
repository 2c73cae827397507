//! Integration tests for sur

use std::path::{Path, PathBuf};

/// Write a sublet source tree and its specification, returning the spec path
fn write_sublet(
    dir: &Path,
    name: &str,
    version: &str,
    dependencies: &[&str],
    notes: Option<&str>,
) -> PathBuf {
    let lower = name.to_lowercase();
    let root = dir.join(format!("src-{}-{}", lower, version));
    std::fs::create_dir_all(root.join("icons")).unwrap();
    std::fs::write(root.join(format!("{}.rb", lower)), format!("# {} {}", name, version)).unwrap();
    std::fs::write(root.join(format!("icons/{}.xbm", lower)), "#define w 8").unwrap();

    let deps: Vec<String> = dependencies.iter().map(|d| format!("\"{}\"", d)).collect();
    let mut spec = format!(
        "name = \"{name}\"\nversion = \"{version}\"\ndescription = \"The {name} sublet\"\n\
         tags = [\"Time\"]\nfiles = [\"{lower}.rb\"]\nicons = [\"icons/{lower}.xbm\"]\n\
         dependencies = [{deps}]\n",
        deps = deps.join(", ")
    );
    if let Some(notes) = notes {
        spec.push_str(&format!("notes = \"{}\"\n", notes));
    }

    let spec_file = root.join(format!("{}.spec", lower));
    std::fs::write(&spec_file, spec).unwrap();
    spec_file
}

mod cli_tests {
    use super::write_sublet;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A config file pointing every directory into `dir`
    fn isolated_config(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            format!(
                "[repository]\nurl = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n\n\
                 [paths]\ncache_dir = \"{}\"\ndata_dir = \"{}\"\n",
                dir.join("cache").display(),
                dir.join("data").display()
            ),
        )
        .unwrap();
        path
    }

    fn sur() -> Command {
        cargo_bin_cmd!("sur")
    }

    fn sur_in(dir: &Path) -> Command {
        let mut cmd = sur();
        cmd.arg("--config").arg(isolated_config(dir));
        cmd
    }

    #[test]
    fn help_displays() {
        sur()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("sublet repository client"));
    }

    #[test]
    fn version_displays() {
        sur()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sur"));
    }

    #[test]
    fn completions_generate() {
        sur()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sur"));
    }

    #[test]
    fn config_path_follows_flag() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("http://127.0.0.1:9"));
    }

    #[test]
    fn config_set_updates_file() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["config", "set", "cache.remote_max_age_hours", "2"])
            .assert()
            .success();

        let content = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
        assert!(content.contains("remote_max_age_hours = 2"));
        assert!(content.contains("http://127.0.0.1:9"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn list_local_empty() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["list", "local"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No sublets in local cache"));
    }

    #[test]
    fn list_local_json_empty() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["list", "local", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn build_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let spec = temp.path().join("ab.spec");
        std::fs::write(temp.path().join("a.rb"), "a").unwrap();
        std::fs::write(
            &spec,
            "name = \"ab\"\nversion = \"1\"\ndescription = \"d\"\nfiles = [\"a.rb\", \"b.rb\"]\n",
        )
        .unwrap();

        sur_in(temp.path())
            .arg("build")
            .arg(&spec)
            .arg("--output")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Couldn't find file `b.rb'"));

        assert!(!temp.path().join("ab-1.sublet").exists());
    }

    #[test]
    fn build_invalid_spec_lists_problems() {
        let temp = TempDir::new().unwrap();
        let spec = temp.path().join("bad.spec");
        std::fs::write(&spec, "name = \"bad name\"\nversion = \"1\"\n").unwrap();

        sur_in(temp.path())
            .arg("build")
            .arg(&spec)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid specification"))
            .stderr(predicate::str::contains("no files declared"));
    }

    #[test]
    fn build_install_list_uninstall() {
        let temp = TempDir::new().unwrap();
        let spec = write_sublet(temp.path(), "Clock", "0.3", &[], None);

        sur_in(temp.path())
            .arg("build")
            .arg(&spec)
            .arg("-o")
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("clock-0.3.sublet"));

        let package = temp.path().join("clock-0.3.sublet");
        assert!(package.is_file());

        sur_in(temp.path())
            .arg("install")
            .arg(&package)
            .assert()
            .success()
            .stdout(predicate::str::contains("Installed sublet Clock (0.3)"));

        assert!(temp.path().join("data/sublets/clock.rb").is_file());

        sur_in(temp.path())
            .args(["list", "local", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("clock 0.3"));

        sur_in(temp.path())
            .args(["uninstall", "clock"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Uninstalled sublet Clock (0.3)"));

        assert!(!temp.path().join("data/sublets/clock.rb").exists());
    }

    #[test]
    fn submit_rejects_non_package() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("clock.tar");
        std::fs::write(&file, "x").unwrap();

        sur_in(temp.path())
            .arg("submit")
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not a sublet package"));
    }

    #[test]
    fn notes_for_missing_sublet_fails() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["notes", "clock"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("local repository"));
    }

    #[test]
    fn unreachable_repository_fails() {
        let temp = TempDir::new().unwrap();
        sur_in(temp.path())
            .args(["update", "remote"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Remote repository unavailable"));
    }
}

mod engine_tests {
    use super::write_sublet;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use sur::engine::{Engine, InstallOptions, ReloadStatus, UninstallOptions};
    use sur::error::{AnnotateRejection, Repository, SubmitRejection, SurError, SurResult};
    use sur::gateway::{Gateway, TransferProgress};
    use sur::host::HostNotifier;
    use sur::layout::Layout;
    use sur::matcher::Query;
    use sur::spec::Specification;
    use tempfile::TempDir;

    /// In-memory repository serving packages built on disk
    #[derive(Default)]
    struct FakeGateway {
        specs: Vec<Specification>,
        packages: HashMap<String, PathBuf>,
        submit_status: u16,
        annotate_status: u16,
        list_calls: AtomicUsize,
        fetches: AtomicUsize,
        annotations: Mutex<Vec<(String, String)>>,
    }

    impl FakeGateway {
        /// Build `name` `version` and offer it under a digest
        fn offer(&mut self, dir: &Path, name: &str, version: &str, dependencies: &[&str]) {
            self.offer_with_notes(dir, name, version, dependencies, None);
        }

        fn offer_with_notes(
            &mut self,
            dir: &Path,
            name: &str,
            version: &str,
            dependencies: &[&str],
            notes: Option<&str>,
        ) {
            let spec_file = write_sublet(dir, name, version, dependencies, notes);
            let content = std::fs::read_to_string(&spec_file).unwrap();
            let mut spec = Specification::parse(&content, &spec_file).unwrap();
            let built = sur::archive::build(&spec, &spec_file, dir).unwrap();

            let digest = format!("{}-{}", name.to_lowercase(), version);
            spec.digest = Some(digest.clone());
            self.packages.insert(digest, built.path);
            self.specs.push(spec);
        }
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn list(&self) -> SurResult<Vec<Specification>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.specs.clone())
        }

        async fn fetch(
            &self,
            digest: &str,
            dest: &Path,
            progress: Arc<dyn TransferProgress>,
        ) -> SurResult<u64> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let source = self
                .packages
                .get(digest)
                .ok_or_else(|| SurError::remote_status("fetch", 404))?;
            let size = std::fs::copy(source, dest).map_err(|e| SurError::io("copy", e))?;
            progress.advance(size, Some(size));
            Ok(size)
        }

        async fn submit(
            &self,
            _package: &Path,
            _user: &str,
            _progress: Arc<dyn TransferProgress>,
        ) -> SurResult<u16> {
            Ok(self.submit_status)
        }

        async fn annotate(&self, digest: &str, user: &str) -> SurResult<u16> {
            self.annotations
                .lock()
                .unwrap()
                .push((digest.to_string(), user.to_string()));
            Ok(self.annotate_status)
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl HostNotifier for FakeNotifier {
        async fn reload_packages(&self) -> SurResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SurError::ReloadFailed("host is not running".to_string()));
            }
            Ok(())
        }
    }

    struct Fixture {
        temp: TempDir,
        gateway: Arc<FakeGateway>,
        notifier: Arc<FakeNotifier>,
        engine: Engine,
    }

    impl Fixture {
        fn new(gateway: FakeGateway, temp: TempDir) -> Self {
            Self::with_notifier(gateway, FakeNotifier::default(), temp)
        }

        fn with_notifier(gateway: FakeGateway, notifier: FakeNotifier, temp: TempDir) -> Self {
            let gateway = Arc::new(gateway);
            let notifier = Arc::new(notifier);
            let layout = Layout::new(temp.path().join("cache"), temp.path().join("data"));
            let engine = Engine::new(
                layout,
                Duration::from_secs(3600),
                gateway.clone(),
                notifier.clone(),
                "tester",
            );

            Self {
                temp,
                gateway,
                notifier,
                engine,
            }
        }

        fn data(&self) -> PathBuf {
            self.temp.path().join("data")
        }

        /// Every file below the data directory
        fn data_files(&self) -> Vec<PathBuf> {
            fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
                let Ok(entries) = std::fs::read_dir(dir) else {
                    return;
                };
                for entry in entries {
                    let path = entry.unwrap().path();
                    if path.is_dir() {
                        walk(&path, out);
                    } else {
                        out.push(path);
                    }
                }
            }

            let mut files = Vec::new();
            walk(&self.data(), &mut files);
            files.sort();
            files
        }
    }

    fn clock_repository(temp: &TempDir) -> FakeGateway {
        let mut gateway = FakeGateway::default();
        gateway.offer(temp.path(), "Clock", "0.1", &[]);
        gateway.offer(temp.path(), "Clock", "0.15", &[]);
        gateway.offer(temp.path(), "Clock", "0.2", &[]);
        gateway.offer(temp.path(), "cpu", "1.0", &[]);
        gateway
    }

    fn pinned(version: &str) -> InstallOptions {
        InstallOptions {
            version: Some(version.to_string()),
            ..InstallOptions::default()
        }
    }

    #[tokio::test]
    async fn install_fetches_and_routes_files() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);

        let report = fx.engine.install("clock", &pinned("0.2")).await.unwrap();
        assert_eq!(report.spec.version, "0.2");
        assert_eq!(report.reload, ReloadStatus::Skipped);

        assert!(fx.data().join("sublets/clock.rb").is_file());
        assert!(fx.data().join("icons/clock.xbm").is_file());
        assert!(fx.data().join("specifications/Clock-0.2.spec").is_file());
        assert_eq!(
            fx.engine.installed_version("CLOCK").await.unwrap().as_deref(),
            Some("0.2")
        );
    }

    #[tokio::test]
    async fn install_takes_first_match() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);

        let report = fx
            .engine
            .install("clock", &InstallOptions::default())
            .await
            .unwrap();
        assert_eq!(report.spec.version, "0.1");
    }

    #[tokio::test]
    async fn install_twice_is_already_installed_and_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("cpu", &InstallOptions::default()).await.unwrap();

        let before = fx.data_files();
        let local_snapshot = fx.temp.path().join("cache/local.yaml");
        let snapshot_before = std::fs::read_to_string(&local_snapshot).unwrap();
        let fetches = fx.gateway.fetches.load(Ordering::SeqCst);

        let err = fx
            .engine
            .install("cpu", &InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SurError::AlreadyInstalled(ref name) if name == "cpu"));
        assert_eq!(fx.data_files(), before);
        assert_eq!(std::fs::read_to_string(&local_snapshot).unwrap(), snapshot_before);
        assert_eq!(fx.gateway.fetches.load(Ordering::SeqCst), fetches);
    }

    #[tokio::test]
    async fn install_unknown_is_not_found() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);

        let err = fx
            .engine
            .install("weather", &InstallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SurError::NotFound {
                repository: Repository::Remote,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn install_unsatisfied_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut gateway = FakeGateway::default();
        gateway.offer(temp.path(), "mpd", "0.4", &["sur-no-such-command-xyz"]);
        let mut fx = Fixture::new(gateway, temp);

        let err = fx
            .engine
            .install("mpd", &InstallOptions::default())
            .await
            .unwrap_err();

        match err {
            SurError::UnsatisfiedDependency { name, missing } => {
                assert_eq!(name, "mpd");
                assert_eq!(missing, vec!["sur-no-such-command-xyz"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fx.data_files().is_empty());
        assert_eq!(fx.gateway.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn install_unsatisfied_package_file_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut gateway = FakeGateway::default();
        gateway.offer(temp.path(), "mpd", "0.4", &["sur-no-such-command-xyz"]);
        let package = gateway.packages["mpd-0.4"].clone();
        let mut fx = Fixture::new(FakeGateway::default(), temp);

        let err = fx
            .engine
            .install(package.to_str().unwrap(), &InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SurError::UnsatisfiedDependency { .. }));
        assert!(fx.data_files().is_empty());
    }

    #[tokio::test]
    async fn install_rejects_package_escaping_data_dir() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.sublet");
        let mut builder = tar::Builder::new(std::fs::File::create(&archive).unwrap());
        let spec_text = "name = \"../../escaped\"\nversion = \"1\"\n\
                         description = \"d\"\nfiles = [\"evil.rb\"]\n";
        for (name, data) in [("evil.spec", spec_text.as_bytes()), ("evil.rb", &b"x"[..])] {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, name, data).unwrap();
        }
        builder.finish().unwrap();

        let mut gateway = FakeGateway::default();
        gateway.specs.push(Specification {
            name: "evil".to_string(),
            version: "1".to_string(),
            digest: Some("evil-1".to_string()),
            ..Specification::default()
        });
        gateway.packages.insert("evil-1".to_string(), archive);
        let mut fx = Fixture::new(gateway, temp);

        let err = fx
            .engine
            .install("evil", &InstallOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SurError::InvalidSpecification { .. }));
        assert!(fx.data_files().is_empty());
        assert!(!fx.temp.path().join("escaped-1.spec").exists());
    }

    #[tokio::test]
    async fn install_reload_reports_status() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);

        let options = InstallOptions {
            reload: true,
            ..InstallOptions::default()
        };
        let report = fx.engine.install("cpu", &options).await.unwrap();
        assert_eq!(report.reload, ReloadStatus::Done);
        assert_eq!(fx.notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_install() {
        let temp = TempDir::new().unwrap();
        let notifier = FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        };
        let mut fx = Fixture::with_notifier(clock_repository(&temp), notifier, temp);

        let options = InstallOptions {
            reload: true,
            ..InstallOptions::default()
        };
        let report = fx.engine.install("cpu", &options).await.unwrap();
        assert!(matches!(report.reload, ReloadStatus::Failed(_)));
        assert!(fx.data().join("sublets/cpu.rb").is_file());
    }

    #[tokio::test]
    async fn uninstall_removes_reordered_file() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("clock", &pinned("0.2")).await.unwrap();

        let sublets = fx.data().join("sublets");
        std::fs::rename(sublets.join("clock.rb"), sublets.join("10_clock.rb")).unwrap();

        let report = fx
            .engine
            .uninstall("clock", &UninstallOptions::default())
            .await
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.removed.len(), 3);
        assert!(fx.data_files().is_empty());
        assert!(fx.engine.list(Repository::Local).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn uninstall_collects_failures() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("cpu", &InstallOptions::default()).await.unwrap();
        std::fs::remove_file(fx.data().join("icons/cpu.xbm")).unwrap();

        let report = fx
            .engine
            .uninstall("cpu", &UninstallOptions::default())
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].0.ends_with("cpu.xbm"));
        assert!(!fx.data().join("sublets/cpu.rb").exists());
        assert!(!fx.data().join("specifications/cpu-1.0.spec").exists());
    }

    #[tokio::test]
    async fn uninstall_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(FakeGateway::default(), temp);

        let err = fx
            .engine
            .uninstall("clock", &UninstallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SurError::NotFound {
                repository: Repository::Local,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn upgrade_picks_first_greater_version() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("clock", &pinned("0.1")).await.unwrap();

        let plan = fx.engine.plan_upgrade().await.unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].installed.version, "0.1");
        assert_eq!(plan[0].available.version, "0.15");

        let report = fx.engine.apply_upgrade(&plan, true).await.unwrap();
        assert_eq!(report.upgraded.len(), 1);
        assert_eq!(report.reload, ReloadStatus::Done);
        assert_eq!(fx.notifier.calls.load(Ordering::SeqCst), 1);

        assert_eq!(
            fx.engine.installed_version("clock").await.unwrap().as_deref(),
            Some("0.15")
        );
        assert!(!fx.data().join("specifications/Clock-0.1.spec").exists());
        assert!(fx.data().join("specifications/Clock-0.15.spec").exists());
    }

    #[tokio::test]
    async fn upgrade_with_nothing_newer_is_empty() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("cpu", &InstallOptions::default()).await.unwrap();

        let plan = fx.engine.plan_upgrade().await.unwrap();
        assert!(plan.is_empty());

        let report = fx.engine.apply_upgrade(&plan, true).await.unwrap();
        assert!(report.upgraded.is_empty());
        assert_eq!(report.reload, ReloadStatus::Skipped);
    }

    #[tokio::test]
    async fn reorder_renames_in_chosen_order() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("clock", &pinned("0.2")).await.unwrap();
        fx.engine.install("cpu", &InstallOptions::default()).await.unwrap();

        let entries = fx.engine.reorder_entries().await.unwrap();
        let files: Vec<_> = entries.iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["clock.rb", "cpu.rb"]);

        let report = fx.engine.apply_reorder(&entries, &[2, 1]).await.unwrap();
        assert_eq!(report.renamed.len(), 2);

        let sublets = fx.data().join("sublets");
        assert!(sublets.join("10_cpu.rb").is_file());
        assert!(sublets.join("20_clock.rb").is_file());

        // Reordered files still belong to their sublet
        let entries = fx.engine.reorder_entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        fx.engine
            .uninstall("clock", &UninstallOptions::default())
            .await
            .unwrap();
        assert!(!sublets.join("20_clock.rb").exists());
    }

    #[tokio::test]
    async fn reorder_rejects_out_of_range() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);
        fx.engine.install("cpu", &InstallOptions::default()).await.unwrap();

        let entries = fx.engine.reorder_entries().await.unwrap();
        assert!(fx.engine.apply_reorder(&entries, &[1, 5]).await.is_err());
        assert!(fx.data().join("sublets/cpu.rb").is_file());
    }

    #[tokio::test]
    async fn submit_maps_statuses() {
        let temp = TempDir::new().unwrap();
        let mut gateway = clock_repository(&temp);
        gateway.submit_status = 409;
        let package = gateway.packages["cpu-1.0"].clone();
        let mut fx = Fixture::new(gateway, temp);

        let err = fx.engine.submit(&package).await.unwrap_err();
        assert!(matches!(
            err,
            SurError::SubmitRejected(SubmitRejection::DuplicateVersion)
        ));
    }

    #[tokio::test]
    async fn submit_success_refreshes_remote() {
        let temp = TempDir::new().unwrap();
        let mut gateway = clock_repository(&temp);
        gateway.submit_status = 200;
        let package = gateway.packages["cpu-1.0"].clone();
        let mut fx = Fixture::new(gateway, temp);

        let spec = fx.engine.submit(&package).await.unwrap();
        assert_eq!(spec.name, "cpu");
        assert_eq!(fx.gateway.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn submit_rejects_wrong_extension() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("cpu.tar");
        std::fs::write(&file, "x").unwrap();
        let mut fx = Fixture::new(FakeGateway::default(), temp);

        let err = fx.engine.submit(&file).await.unwrap_err();
        assert!(matches!(err, SurError::NotAPackage(_)));
    }

    #[tokio::test]
    async fn annotate_posts_digest_and_user() {
        let temp = TempDir::new().unwrap();
        let mut gateway = clock_repository(&temp);
        gateway.annotate_status = 200;
        let mut fx = Fixture::new(gateway, temp);

        fx.engine
            .annotate("clock", Some("0.15".to_string()))
            .await
            .unwrap();

        let annotations = fx.gateway.annotations.lock().unwrap();
        assert_eq!(
            *annotations,
            vec![("clock-0.15".to_string(), "tester".to_string())]
        );
    }

    #[tokio::test]
    async fn annotate_rejections() {
        let temp = TempDir::new().unwrap();
        let mut gateway = clock_repository(&temp);
        gateway.annotate_status = 404;
        let mut fx = Fixture::new(gateway, temp);

        let err = fx.engine.annotate("cpu", None).await.unwrap_err();
        assert!(matches!(
            err,
            SurError::AnnotateRejected(AnnotateRejection::NotFound)
        ));

        let err = fx.engine.annotate("weather", None).await.unwrap_err();
        assert!(matches!(err, SurError::NotFound { .. }));
    }

    #[tokio::test]
    async fn query_filters_and_reports_empty() {
        let temp = TempDir::new().unwrap();
        let mut fx = Fixture::new(clock_repository(&temp), temp);

        let found = fx
            .engine
            .query(
                &Query::name("clock").with_version(Some("0.15".to_string())),
                Repository::Remote,
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].version, "0.15");

        let found = fx
            .engine
            .query(&Query::name("time").with_tags(true), Repository::Remote)
            .await
            .unwrap();
        assert_eq!(found.len(), 4);

        let err = fx
            .engine
            .query(&Query::name("weather"), Repository::Remote)
            .await
            .unwrap_err();
        assert!(matches!(err, SurError::NotFound { .. }));
    }

    #[tokio::test]
    async fn remote_cache_is_sorted_and_counted() {
        let temp = TempDir::new().unwrap();
        let mut gateway = FakeGateway::default();
        gateway.offer(temp.path(), "cpu", "1.0", &[]);
        gateway.offer(temp.path(), "Clock", "0.2", &[]);
        gateway.offer(temp.path(), "Clock", "0.15", &[]);
        let mut fx = Fixture::new(gateway, temp);

        assert_eq!(fx.engine.update(Repository::Remote).await.unwrap(), 3);
        let idents: Vec<_> = fx
            .engine
            .list(Repository::Remote)
            .await
            .unwrap()
            .iter()
            .map(|s| s.ident())
            .collect();
        assert_eq!(idents, vec!["Clock-0.15", "Clock-0.2", "cpu-1.0"]);
    }

    #[tokio::test]
    async fn notes_of_installed_sublet() {
        let temp = TempDir::new().unwrap();
        let mut gateway = FakeGateway::default();
        gateway.offer_with_notes(temp.path(), "Clock", "0.3", &[], Some("Set the format"));
        gateway.offer(temp.path(), "cpu", "1.0", &[]);
        let mut fx = Fixture::new(gateway, temp);
        fx.engine.install("clock", &InstallOptions::default()).await.unwrap();
        fx.engine.install("cpu", &InstallOptions::default()).await.unwrap();

        assert_eq!(
            fx.engine.notes("clock").await.unwrap().as_deref(),
            Some("Set the format")
        );
        assert_eq!(fx.engine.notes("cpu").await.unwrap(), None);
    }

    #[tokio::test]
    async fn build_invalid_spec_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let spec = temp.path().join("bad.spec");
        std::fs::write(&spec, "name = \"\"\nversion = \"x\"\n").unwrap();
        let out = temp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let fx = Fixture::new(FakeGateway::default(), temp);

        let err = fx.engine.build(&spec, &out).await.unwrap_err();
        match err {
            SurError::InvalidSpecification { diagnostics, .. } => {
                assert!(diagnostics.len() >= 3)
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }
}
