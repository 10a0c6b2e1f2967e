//! Plugin Manager
//!
//! Resolves command line tokens to a plugin, runs it, and builds plugin
//! inventories for help output. Nothing is cached: every call looks at the
//! file system again.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, DEFAULT_PLUGINS_DIR, DEFAULT_PLUGIN_PREFIX};
use crate::error::Result;
use crate::plugin::help;
use crate::plugin::invoker::{current_env, Invoker, ProcessInvoker};
use crate::plugin::locator::{Candidate, Locator, SearchPath};
use crate::plugin::types::{ExternalPlugin, Plugin, PluginList};

/// Manager settings, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Plugin directory (may start with ~)
    pub plugins_dir: PathBuf,
    /// Also search the search path
    pub lookup_in_path: bool,
    /// File name prefixes, tried in order
    pub prefixes: Vec<String>,
    /// Source of search path directories
    pub search_path: SearchPath,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from(DEFAULT_PLUGINS_DIR),
            lookup_in_path: false,
            prefixes: vec![DEFAULT_PLUGIN_PREFIX.to_string()],
            search_path: SearchPath::Environment,
        }
    }
}

impl ManagerConfig {
    pub fn new(plugins_dir: impl Into<PathBuf>, lookup_in_path: bool) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            lookup_in_path,
            ..Self::default()
        }
    }

    /// Settings from the `[plugins]` table of the config file
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.plugins.directory.clone(),
            config.plugins.lookup_in_path,
        )
    }

    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = search_path;
        self
    }
}

/// A resolved plugin and how many leading tokens it consumed
#[derive(Debug, Clone)]
pub struct FoundPlugin {
    pub plugin: Arc<dyn Plugin>,
    pub consumed: usize,
}

/// Plugin Manager
pub struct Manager {
    locator: Locator,
    internal_plugins: PluginList,
    invoker: Box<dyn Invoker>,
}

impl Manager {
    /// Create a manager with no internal plugins
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_internal_plugins(config, PluginList::new())
    }

    /// Create a manager aware of plugins compiled into the host
    pub fn with_internal_plugins(config: ManagerConfig, internal_plugins: PluginList) -> Self {
        let locator = Locator::new(
            config.prefixes,
            config.plugins_dir,
            config.lookup_in_path,
            config.search_path,
        );
        Self {
            locator,
            internal_plugins,
            invoker: Box::new(ProcessInvoker::new()),
        }
    }

    /// Replace the process invoker used by `handle_plugin_command`
    pub fn with_invoker(mut self, invoker: impl Invoker + 'static) -> Self {
        self.invoker = Box::new(invoker);
        self
    }

    pub fn plugins_dir(&self) -> &Path {
        self.locator.plugins_dir()
    }

    pub fn lookup_in_path(&self) -> bool {
        self.locator.lookup_in_path()
    }

    /// Resolve the longest plugin matching a leading run of `args`.
    ///
    /// Flags are skipped. At each length an internal plugin is tried before
    /// the file system. A word that is not valid UTF-8 cannot name a plugin,
    /// so matching stops in front of it. `Ok(None)` means nothing matched.
    pub fn find_plugin(&self, args: &[OsString]) -> Result<Option<FoundPlugin>> {
        let words: Vec<&str> = args
            .iter()
            .filter(|arg| !is_flag(arg))
            .map_while(|arg| arg.to_str())
            .collect();
        // hyphens inside a word match underscores in file names
        let normalized: Vec<String> = words.iter().map(|w| w.replace('-', "_")).collect();

        for len in (1..=words.len()).rev() {
            if let Some(plugin) = self.find_internal(&words[..len]) {
                debug!(plugin = %plugin.name(), consumed = len, "resolved internal plugin");
                return Ok(Some(FoundPlugin {
                    plugin,
                    consumed: len,
                }));
            }

            let name = normalized[..len].join("-");
            if let Some(path) = self.locator.lookup(&name) {
                if let Some(plugin) = self.external_from_path(path) {
                    debug!(plugin = %plugin.name(), consumed = len, "resolved external plugin");
                    return Ok(Some(FoundPlugin {
                        plugin,
                        consumed: len,
                    }));
                }
            }
        }

        debug!(?args, "no plugin found");
        Ok(None)
    }

    /// Find and run a plugin for `args`.
    ///
    /// External plugins go through the invoker with
    /// `[path] + args[consumed..]`; internal ones run in-process with
    /// `args[consumed..]`. Tokens are forwarded untouched. Returns `false`
    /// when no plugin matched.
    pub fn handle_plugin_command(&self, args: &[OsString]) -> Result<bool> {
        let Some(found) = self.find_plugin(args)? else {
            return Ok(false);
        };

        let rest = args.get(found.consumed..).unwrap_or_default();
        match found.plugin.path() {
            Some(path) => {
                let mut argv = Vec::with_capacity(rest.len() + 1);
                argv.push(path.as_os_str().to_owned());
                argv.extend(rest.iter().cloned());
                self.invoker.execute(path, &argv, &current_env())?;
            }
            None => found.plugin.execute(rest)?,
        }
        Ok(true)
    }

    /// All external plugins from the plugin directory and, when enabled,
    /// the search path, sorted by name.
    pub fn list_plugins(&self) -> Result<PluginList> {
        let mut plugins: PluginList = self
            .locator
            .scan_plugins_dir()
            .into_iter()
            .chain(self.locator.scan_search_path())
            .filter_map(|candidate| self.external_from_candidate(candidate))
            .collect();
        plugins.sort_by_name();
        Ok(plugins)
    }

    /// External and internal plugins nested strictly below `group`.
    ///
    /// Empty for an empty group.
    pub fn list_plugins_for_command_group(&self, group: &[String]) -> Result<PluginList> {
        if group.is_empty() {
            return Ok(PluginList::new());
        }

        let mut all = self.list_plugins()?;
        all.extend(self.internal_plugins.iter().cloned());
        let mut nested = all.nested_under(group);
        nested.sort_by_name();
        Ok(nested)
    }

    /// Plugin help block for the command at `command_path` (without the
    /// root command name).
    ///
    /// The root lists every plugin, external and internal; other commands
    /// list the plugins of their command group. Empty when nothing applies.
    pub fn plugins_help(&self, command_path: &[String]) -> Result<String> {
        let plugins = if command_path.is_empty() {
            let mut all = self.list_plugins()?;
            all.extend(self.internal_plugins.iter().cloned());
            all.sort_by_name();
            all
        } else {
            self.list_plugins_for_command_group(command_path)?
        };
        Ok(help::render(&plugins, command_path.len()))
    }

    fn find_internal(&self, words: &[&str]) -> Option<Arc<dyn Plugin>> {
        self.internal_plugins
            .iter()
            .find(|p| p.command_parts().iter().map(String::as_str).eq(words.iter().copied()))
            .cloned()
    }

    fn external_from_path(&self, path: PathBuf) -> Option<Arc<dyn Plugin>> {
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let prefix = self.locator.prefixes().iter().find(|prefix| {
            file_name
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('-'))
        })?;
        self.external_from_candidate(Candidate {
            path,
            prefix: prefix.clone(),
        })
    }

    fn external_from_candidate(&self, candidate: Candidate) -> Option<Arc<dyn Plugin>> {
        ExternalPlugin::from_path(candidate.path, &candidate.prefix)
            .map(|plugin| Arc::new(plugin) as Arc<dyn Plugin>)
    }
}

fn is_flag(arg: &OsStr) -> bool {
    arg.as_encoded_bytes().starts_with(b"-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugin::types::InternalPlugin;
    use std::cell::RefCell;
    use std::fs;
    use std::process::Command;
    use std::rc::Rc;
    use tempfile::TempDir;

    const TEST_PLUGIN_SCRIPT: &str = "#!/bin/sh\necho \"OK $*\"\n";

    struct TestContext {
        plugins_dir: TempDir,
        path_dir: TempDir,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                plugins_dir: TempDir::new().unwrap(),
                path_dir: TempDir::new().unwrap(),
            }
        }

        fn config(&self, lookup_in_path: bool) -> ManagerConfig {
            ManagerConfig::new(self.plugins_dir.path(), lookup_in_path).with_search_path(
                SearchPath::Dirs(vec![
                    self.path_dir.path().to_path_buf(),
                    PathBuf::from("/nonexistent-kn-path-entry"),
                ]),
            )
        }

        fn manager(&self, lookup_in_path: bool) -> Manager {
            Manager::new(self.config(lookup_in_path))
        }

        fn create_plugin(&self, name: &str) -> PathBuf {
            create_plugin_in(self.plugins_dir.path(), name)
        }

        fn create_path_plugin(&self, name: &str) -> PathBuf {
            create_plugin_in(self.path_dir.path(), name)
        }
    }

    fn create_plugin_in(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, TEST_PLUGIN_SCRIPT).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        // noise that must never be picked up
        fs::write(dir.join(format!("non-plugin-prefix-{}", name)), "").unwrap();
        fs::create_dir_all(dir.join("bogus-dir")).unwrap();
        path
    }

    fn args(tokens: &[&str]) -> Vec<OsString> {
        tokens.iter().map(OsString::from).collect()
    }

    fn parts(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn internal(parts: &[&str]) -> Arc<dyn Plugin> {
        let name = parts.join(" ");
        Arc::new(InternalPlugin::new(
            parts.iter().copied(),
            format!("desc: {}", name),
            |_| Ok(()),
        ))
    }

    /// Records what would have been executed
    #[derive(Clone, Default)]
    struct RecordingInvoker {
        calls: Rc<RefCell<Vec<(PathBuf, Vec<OsString>)>>>,
    }

    impl Invoker for RecordingInvoker {
        fn execute(
            &self,
            path: &Path,
            argv: &[OsString],
            _env: &[(OsString, OsString)],
        ) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((path.to_path_buf(), argv.to_vec()));
            Ok(())
        }
    }

    /// Runs the plugin as a child and keeps its stdout
    #[derive(Clone, Default)]
    struct CapturingInvoker {
        output: Rc<RefCell<String>>,
    }

    impl Invoker for CapturingInvoker {
        fn execute(
            &self,
            path: &Path,
            argv: &[OsString],
            env: &[(OsString, OsString)],
        ) -> Result<()> {
            let output = Command::new(path)
                .args(&argv[1..])
                .env_clear()
                .envs(env.iter().cloned())
                .output()
                .map_err(|source| PluginError::Spawn {
                    path: path.to_path_buf(),
                    source,
                })?;
            self.output
                .borrow_mut()
                .push_str(&String::from_utf8_lossy(&output.stdout));
            Ok(())
        }
    }

    #[test]
    fn test_empty_find() {
        let ctx = TestContext::new();
        let manager = ctx.manager(false);

        assert!(manager.find_plugin(&[]).unwrap().is_none());
        assert!(!manager.plugins_dir().as_os_str().is_empty());
        assert!(!manager.lookup_in_path());
    }

    #[test]
    fn test_find_with_not_found_result() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-test");
        let manager = ctx.manager(true);

        let found = manager
            .find_plugin(&args(&["bogus", "plugin", "name"]))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_lookup_in_plugins_dir() {
        let ctx = TestContext::new();
        let path = ctx.create_plugin("kn-test");
        let manager = ctx.manager(false);

        let found = manager.find_plugin(&args(&["test"])).unwrap().unwrap();
        assert_eq!(found.consumed, 1);
        assert_eq!(found.plugin.command_parts()[0], "test");
        assert_eq!(found.plugin.path(), Some(path.as_path()));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-a");
        ctx.create_plugin("kn-a-b");
        let manager = ctx.manager(false);

        let found = manager.find_plugin(&args(&["a", "b"])).unwrap().unwrap();
        assert_eq!(found.plugin.name(), "a b");
        assert_eq!(found.consumed, 2);

        let found = manager.find_plugin(&args(&["a", "c"])).unwrap().unwrap();
        assert_eq!(found.plugin.name(), "a");
        assert_eq!(found.consumed, 1);
    }

    #[test]
    fn test_flags_are_skipped_when_matching() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-service-log");
        let manager = ctx.manager(false);

        let found = manager
            .find_plugin(&args(&["service", "--namespace=x", "log", "-f"]))
            .unwrap()
            .unwrap();
        assert_eq!(found.plugin.name(), "service log");
        assert_eq!(found.consumed, 2);
    }

    #[test]
    fn test_hyphenated_tokens_match_underscored_files() {
        let ctx = TestContext::new();
        let path = ctx.create_plugin("kn-test_with_dash-longer");
        let manager = ctx.manager(false);

        let found = manager
            .find_plugin(&args(&["test-with-dash", "longer"]))
            .unwrap()
            .unwrap();
        assert_eq!(found.plugin.path(), Some(path.as_path()));
        assert_eq!(found.plugin.command_parts(), ["test-with-dash", "longer"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_plugin_in_path() {
        let ctx = TestContext::new();
        let path = ctx.create_path_plugin("kn-path-test");
        let tokens = args(&["path", "test"]);

        let found = ctx.manager(true).find_plugin(&tokens).unwrap().unwrap();
        assert_eq!(found.plugin.path(), Some(path.as_path()));
        assert_eq!(found.plugin.command_parts(), ["path", "test"]);
        assert!(!found.plugin.description().unwrap().is_empty());

        assert!(ctx.manager(false).find_plugin(&tokens).unwrap().is_none());
    }

    #[test]
    fn test_find_plugin_internally() {
        let ctx = TestContext::new();
        let internals: PluginList = vec![internal(&["a", "b"]), internal(&["a"])]
            .into_iter()
            .collect();
        let manager = Manager::with_internal_plugins(ctx.config(false), internals);

        for (tokens, name) in [(&["a", "b"][..], "a b"), (&["a"][..], "a"), (&["a", "c"][..], "a")] {
            let found = manager.find_plugin(&args(tokens)).unwrap().unwrap();
            assert_eq!(found.plugin.name(), name);
            assert_eq!(found.plugin.command_parts().join(" "), name);
            assert!(found.plugin.path().is_none());
        }
    }

    #[test]
    fn test_internal_plugin_shadows_external() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-a-b");
        let internals: PluginList = vec![internal(&["a", "b"])].into_iter().collect();
        let manager = Manager::with_internal_plugins(ctx.config(false), internals);

        let found = manager.find_plugin(&args(&["a", "b"])).unwrap().unwrap();
        assert!(found.plugin.path().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_plugin_execute() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-test_with_dash-longer");
        let manager = ctx.manager(false);

        let found = manager
            .find_plugin(&args(&["test-with-dash", "longer"]))
            .unwrap()
            .unwrap();
        let plugin = ExternalPlugin::from_path(found.plugin.path().unwrap().to_path_buf(), "kn")
            .unwrap();
        let out = plugin.output(&args(&["arg1", "arg2"])).unwrap();
        assert_eq!(out, "OK arg1 arg2\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_handle_plugin_command_end_to_end() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-test");
        let invoker = CapturingInvoker::default();
        let manager = ctx.manager(false).with_invoker(invoker.clone());

        let handled = manager
            .handle_plugin_command(&args(&["test", "x", "y"]))
            .unwrap();
        assert!(handled);
        assert_eq!(*invoker.output.borrow(), "OK x y\n");
    }

    #[test]
    fn test_handle_plugin_command_forwards_residual_args_verbatim() {
        let ctx = TestContext::new();
        let path = ctx.create_plugin("kn-service-log_tail");
        let invoker = RecordingInvoker::default();
        let manager = ctx.manager(false).with_invoker(invoker.clone());

        let handled = manager
            .handle_plugin_command(&args(&["service", "log-tail", "my-svc", "--since=5m"]))
            .unwrap();
        assert!(handled);

        let calls = invoker.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, path);
        assert_eq!(
            calls[0].1,
            vec![path.into_os_string(), "my-svc".into(), "--since=5m".into()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_handle_plugin_command_forwards_non_utf8_args() {
        use std::os::unix::ffi::OsStringExt;

        let ctx = TestContext::new();
        let path = ctx.create_plugin("kn-test");
        let invoker = RecordingInvoker::default();
        let manager = ctx.manager(false).with_invoker(invoker.clone());

        let raw = OsString::from_vec(b"caf\xe9".to_vec());
        let tokens = vec![OsString::from("test"), raw.clone(), OsString::from("-x")];
        assert!(manager.handle_plugin_command(&tokens).unwrap());

        let calls = invoker.calls.borrow();
        assert_eq!(calls[0].1, vec![path.into_os_string(), raw, "-x".into()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_word_ends_matching() {
        use std::os::unix::ffi::OsStringExt;

        let ctx = TestContext::new();
        ctx.create_plugin("kn-a");
        ctx.create_plugin("kn-a-b");
        let manager = ctx.manager(false);

        let tokens = vec![
            OsString::from("a"),
            OsString::from_vec(b"\xff".to_vec()),
            OsString::from("b"),
        ];
        let found = manager.find_plugin(&tokens).unwrap().unwrap();
        assert_eq!(found.plugin.name(), "a");
        assert_eq!(found.consumed, 1);
    }

    #[test]
    fn test_handle_plugin_command_not_found() {
        let ctx = TestContext::new();
        let invoker = RecordingInvoker::default();
        let manager = ctx.manager(false).with_invoker(invoker.clone());

        assert!(!manager.handle_plugin_command(&args(&["nope"])).unwrap());
        assert!(invoker.calls.borrow().is_empty());
    }

    #[test]
    fn test_handle_plugin_command_runs_internal_in_process() {
        let ctx = TestContext::new();
        let seen: Arc<std::sync::Mutex<Vec<OsString>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let internals: PluginList = vec![Arc::new(InternalPlugin::new(
            ["source", "kafka"],
            "Kafka source",
            move |args: &[OsString]| {
                sink.lock().unwrap().extend(args.iter().cloned());
                Ok(())
            },
        )) as Arc<dyn Plugin>]
        .into_iter()
        .collect();
        let invoker = RecordingInvoker::default();
        let manager = Manager::with_internal_plugins(ctx.config(false), internals)
            .with_invoker(invoker.clone());

        assert!(manager
            .handle_plugin_command(&args(&["source", "kafka", "create", "k1"]))
            .unwrap());
        assert_eq!(*seen.lock().unwrap(), args(&["create", "k1"]));
        assert!(invoker.calls.borrow().is_empty());
    }

    #[test]
    fn test_plugin_list_for_command_group() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-service-log_2");
        ctx.create_plugin("kn-service");
        let manager = ctx.manager(false);

        let list = manager
            .list_plugins_for_command_group(&parts(&["service"]))
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.names(), vec!["service log-2"]);

        let list = manager.list_plugins_for_command_group(&[]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_plugin_list_for_command_group_includes_internal() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-source-github");
        let internals: PluginList = vec![internal(&["source", "kafka"]), internal(&["route"])]
            .into_iter()
            .collect();
        let manager = Manager::with_internal_plugins(ctx.config(false), internals);

        let list = manager
            .list_plugins_for_command_group(&parts(&["source"]))
            .unwrap();
        assert_eq!(list.names(), vec!["source github", "source kafka"]);

        // the general inventory stays external only
        assert_eq!(manager.list_plugins().unwrap().names(), vec!["source github"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_plugin_list() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-zz-test_in_dir");
        ctx.create_path_plugin("kn-aa-path-test");

        let list = ctx.manager(true).list_plugins().unwrap();
        assert_eq!(list.len(), 2, "both plugins found (in dir + in path)");
        assert_eq!(list.names(), vec!["aa path test", "zz test-in-dir"]);
        assert_eq!(
            list.get(0).unwrap().command_parts(),
            ["aa", "path", "test"]
        );
        assert_eq!(list.get(1).unwrap().command_parts(), ["zz", "test-in-dir"]);

        let list = ctx.manager(false).list_plugins().unwrap();
        assert_eq!(list.names(), vec!["zz test-in-dir"]);
    }

    #[test]
    fn test_plugin_list_is_sorted_and_stable() {
        let ctx = TestContext::new();
        for name in ["kn-m", "kn-Z", "kn-a-b", "kn-a"] {
            ctx.create_plugin(name);
        }
        let manager = ctx.manager(false);

        let first = manager.list_plugins().unwrap().names();
        assert_eq!(first, vec!["Z", "a", "a b", "m"]);
        assert_eq!(manager.list_plugins().unwrap().names(), first);
    }

    #[test]
    fn test_missing_plugins_dir_is_not_an_error() {
        let manager = Manager::new(
            ManagerConfig::new("/nonexistent/kn/plugins", false)
                .with_search_path(SearchPath::Dirs(vec![])),
        );
        assert!(manager.find_plugin(&args(&["test"])).unwrap().is_none());
        assert!(manager.list_plugins().unwrap().is_empty());
    }

    #[test]
    fn test_plugin_help_message() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-service-log_2");
        ctx.create_plugin("kn-admin");
        let manager = ctx.manager(false);

        let root = manager.plugins_help(&[]).unwrap();
        let first = root.lines().next().unwrap();
        assert!(first.trim_start().starts_with("admin "));
        assert!(first.contains("kn-admin"));

        let service = manager.plugins_help(&parts(&["service"])).unwrap();
        let first = service.lines().next().unwrap();
        assert!(first.trim_start().starts_with("log-2 "));
        assert!(first.contains("kn-service-log_2"));

        let service_create = manager
            .plugins_help(&parts(&["service", "create"]))
            .unwrap();
        assert!(service_create.is_empty());
    }

    #[test]
    fn test_plugin_help_root_includes_internal() {
        let ctx = TestContext::new();
        ctx.create_plugin("kn-admin");
        let internals: PluginList = vec![internal(&["info"]), internal(&["source", "kafka"])]
            .into_iter()
            .collect();
        let manager = Manager::with_internal_plugins(ctx.config(false), internals);

        let root = manager.plugins_help(&[]).unwrap();
        let shorts: Vec<&str> = root
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(shorts, vec!["admin", "info", "source-kafka"]);
        assert!(root.contains("desc: info"));

        let source = manager.plugins_help(&parts(&["source"])).unwrap();
        assert_eq!(source, "  kafka  desc: source kafka");
    }

    #[cfg(unix)]
    #[test]
    fn test_plugin_help_shows_probed_description() {
        let ctx = TestContext::new();
        let path = ctx.plugins_dir.path().join("kn-service-log");
        fs::write(
            &path,
            "#!/bin/sh\nif [ \"$1\" = \"--plugin-info\" ]; then\n  echo \"description: Tail logs\"\nfi\n",
        )
        .unwrap();
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        let manager = ctx.manager(false);

        let service = manager.plugins_help(&parts(&["service"])).unwrap();
        assert_eq!(service, "  log  Tail logs");
    }

    #[test]
    fn test_manager_config_from_config() {
        let mut config = Config::default();
        config.plugins.lookup_in_path = true;
        let manager_config = ManagerConfig::from_config(&config);
        assert_eq!(manager_config.plugins_dir, PathBuf::from(DEFAULT_PLUGINS_DIR));
        assert!(manager_config.lookup_in_path);
        assert_eq!(manager_config.prefixes, vec!["kn"]);
    }
}
