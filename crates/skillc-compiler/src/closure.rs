//! Dependency Closure Resolver.
//!
//! Given the source of an execute body and the module it was written in,
//! computes everything that has to be inlined ahead of the body so that it
//! runs with no module system: top-level classes, functions and bindings it
//! references (transitively), the schema-library imports it uses, and the
//! external packages the bundler must provide.
//!
//! References to local imports are followed into the imported module, up
//! to a configurable number of hops. Framework imports are dropped.

use crate::syntax::{
    DeclKind, ImportBinding, Lexed, ModuleScan, enum_references, remove_base_class, strip_types,
};
use skillc_core::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Classification of an import specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// Relative or absolute path into the project
    Local,
    /// The tool framework package; not available at execution time
    Framework,
    /// Schema library, passed through as `require(...)`
    Schema,
    /// Any other package; handed to the bundler
    External,
}

/// Classifies import specifiers against configured package lists.
#[derive(Debug, Clone)]
pub struct ImportClassifier {
    framework: Vec<String>,
    schema: Vec<String>,
}

impl ImportClassifier {
    /// Creates a classifier.
    #[must_use]
    pub const fn new(framework: Vec<String>, schema: Vec<String>) -> Self {
        Self { framework, schema }
    }

    /// Classifies one specifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_compiler::closure::{ImportClassifier, ImportKind};
    ///
    /// let c = ImportClassifier::new(vec!["lua-cli".into()], vec!["zod".into()]);
    /// assert_eq!(c.classify("./services/weather"), ImportKind::Local);
    /// assert_eq!(c.classify("lua-cli/skill"), ImportKind::Framework);
    /// assert_eq!(c.classify("zod"), ImportKind::Schema);
    /// assert_eq!(c.classify("axios"), ImportKind::External);
    /// ```
    #[must_use]
    pub fn classify(&self, specifier: &str) -> ImportKind {
        if specifier.starts_with('.') || specifier.starts_with('/') {
            ImportKind::Local
        } else if self.framework.iter().any(|p| is_package(specifier, p)) {
            ImportKind::Framework
        } else if self.schema.iter().any(|p| is_package(specifier, p)) {
            ImportKind::Schema
        } else {
            ImportKind::External
        }
    }
}

fn is_package(specifier: &str, package: &str) -> bool {
    specifier == package
        || specifier
            .strip_prefix(package)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Identifier of a module in a [`ModuleGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

/// A loaded and scanned source file.
#[derive(Debug)]
pub struct SourceModule {
    /// Normalized file path
    pub path: PathBuf,
    /// File contents
    pub source: String,
    /// Top-level scan
    pub scan: ModuleScan,
}

/// Source files loaded during one compile, keyed by path.
///
/// Files are read lazily the first time an import resolves to them and are
/// never written.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<SourceModule>,
    by_path: HashMap<PathBuf, ModuleId>,
}

impl ModuleGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module from memory, or returns the existing one for `path`.
    pub fn add(&mut self, path: impl AsRef<Path>, source: impl Into<String>) -> ModuleId {
        let path = normalize(path.as_ref());
        if let Some(&id) = self.by_path.get(&path) {
            return id;
        }
        let source = source.into();
        let scan = ModuleScan::new(&Lexed::new(&source));
        debug!(
            path = %path.display(),
            imports = scan.imports.len(),
            declarations = scan.declarations.len(),
            "Scanned module"
        );
        let id = ModuleId(self.modules.len());
        self.by_path.insert(path.clone(), id);
        self.modules.push(SourceModule { path, source, scan });
        id
    }

    /// Reads and adds a module from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceNotFound`] if the file does not exist and
    /// [`Error::Io`] if it cannot be read.
    pub fn load(&mut self, path: &Path) -> Result<ModuleId> {
        let path = normalize(path);
        if let Some(&id) = self.by_path.get(&path) {
            return Ok(id);
        }
        let source = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::SourceNotFound { path: path.clone() }
            } else {
                Error::io(&path, e)
            }
        })?;
        Ok(self.add(path, source))
    }

    /// Module by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    #[must_use]
    pub fn module(&self, id: ModuleId) -> &SourceModule {
        &self.modules[id.0]
    }

    /// Resolves a local import specifier relative to module `from`.
    ///
    /// Tries the path as written, with `.ts`, `.tsx` and `.js` appended,
    /// with a `.js` extension swapped for `.ts`, and as a directory with an
    /// `index` file. Returns `None` when nothing matches or the file cannot
    /// be read.
    pub fn resolve(&mut self, from: ModuleId, specifier: &str) -> Option<ModuleId> {
        let dir = self.module(from).path.parent()?.to_path_buf();
        let base = dir.join(specifier);
        let found = candidate_paths(&base).into_iter().find(|p| p.is_file())?;
        match self.load(&found) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Cannot read '{}': {e}", found.display());
                None
            }
        }
    }
}

fn candidate_paths(base: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    match base.extension().and_then(|e| e.to_str()) {
        Some("js" | "mjs" | "cjs") => {
            out.push(base.with_extension("ts"));
            out.push(base.with_extension("tsx"));
            out.push(base.to_path_buf());
        }
        Some("ts" | "tsx" | "jsx") => out.push(base.to_path_buf()),
        _ => {}
    }
    let raw = base.as_os_str().to_string_lossy();
    for ext in ["ts", "tsx", "js"] {
        out.push(PathBuf::from(format!("{raw}.{ext}")));
    }
    for index in ["index.ts", "index.tsx", "index.js"] {
        out.push(base.join(index));
    }
    out
}

/// Collapses `.` and `..` components without touching the file system.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Bindings a tool needs from one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageImport {
    /// Import specifier, e.g. `axios` or `lodash/get`
    pub package: String,
    /// Bindings, deduplicated by local name
    pub bindings: Vec<ImportBinding>,
}

impl PackageImport {
    fn add(&mut self, binding: &ImportBinding) {
        if !self.bindings.iter().any(|b| b.local() == binding.local()) {
            self.bindings.push(binding.clone());
        }
    }
}

/// A declaration selected for inlining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Declaration kind, which decides the emission group
    pub kind: DeclKind,
    /// Names the fragment declares
    pub names: Vec<String>,
    /// JavaScript source, with type-only syntax removed
    pub code: String,
    depth: usize,
    module: ModuleId,
    position: usize,
}

/// Everything an execute body depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Schema-library imports, passed through as `require(...)`
    pub schema_imports: Vec<PackageImport>,
    /// External packages for the bundler
    pub external_imports: Vec<PackageImport>,
    /// Local declarations in emission order
    pub fragments: Vec<Fragment>,
    /// Referenced names bound to local imports that could not be followed
    pub unresolved: Vec<String>,
}

/// Enums, classes and functions come first. Bindings and instantiations
/// share one group and keep their source order, since either may read the
/// other.
const fn emission_group(kind: DeclKind) -> u8 {
    match kind {
        DeclKind::Enum => 0,
        DeclKind::Class => 1,
        DeclKind::Function => 2,
        DeclKind::Binding | DeclKind::Instantiation => 3,
    }
}

/// Computes dependency closures over a [`ModuleGraph`].
#[derive(Debug)]
pub struct ClosureResolver<'a> {
    graph: &'a mut ModuleGraph,
    classifier: &'a ImportClassifier,
    max_local_depth: usize,
}

struct Walk {
    closure: Closure,
    depths: HashMap<ModuleId, usize>,
    visited: HashSet<(ModuleId, String)>,
    included: HashSet<(ModuleId, usize)>,
    declared: HashMap<String, ModuleId>,
    queue: VecDeque<(ModuleId, String)>,
}

impl<'a> ClosureResolver<'a> {
    /// Creates a resolver that follows at most `max_local_depth` local
    /// import hops from the root module.
    pub const fn new(
        graph: &'a mut ModuleGraph,
        classifier: &'a ImportClassifier,
        max_local_depth: usize,
    ) -> Self {
        Self {
            graph,
            classifier,
            max_local_depth,
        }
    }

    /// Resolves the closure of `code`, written in module `root`.
    ///
    /// Names in `exclude` (the execute function's own parameters) are never
    /// resolved.
    pub fn resolve(&mut self, root: ModuleId, code: &str, exclude: &[&str]) -> Closure {
        let lexed = Lexed::new(code);
        let mut walk = Walk {
            closure: Closure::default(),
            depths: HashMap::from([(root, 0)]),
            visited: exclude
                .iter()
                .map(|name| (root, (*name).to_string()))
                .collect(),
            included: HashSet::new(),
            declared: HashMap::new(),
            queue: VecDeque::new(),
        };
        for name in lexed.references(0..lexed.len()) {
            walk.queue.push_back((root, name.to_string()));
        }

        while let Some((module, name)) = walk.queue.pop_front() {
            if !walk.visited.insert((module, name.clone())) {
                continue;
            }
            self.visit(&mut walk, module, &name);
        }

        let mut closure = walk.closure;
        closure.fragments.sort_by_key(|f| {
            (
                emission_group(f.kind),
                std::cmp::Reverse(f.depth),
                f.module,
                f.position,
            )
        });
        debug!(
            fragments = closure.fragments.len(),
            externals = closure.external_imports.len(),
            "Resolved dependency closure"
        );
        closure
    }

    fn visit(&mut self, walk: &mut Walk, module: ModuleId, name: &str) {
        let depth = walk.depths.get(&module).copied().unwrap_or_default();
        let source = self.graph.module(module);

        if let Some(decl) = source.scan.declaration(name) {
            if !walk.included.insert((module, decl.first)) {
                return;
            }
            if let Some(other) = decl
                .names
                .iter()
                .find_map(|n| walk.declared.get(n).filter(|m| **m != module))
            {
                warn!(
                    "'{name}' in {} is already declared by {}; keeping the first",
                    source.path.display(),
                    self.graph.module(*other).path.display()
                );
                return;
            }
            for n in &decl.names {
                walk.declared.insert(n.clone(), module);
            }

            let text = decl.text(&source.source);
            let code = self.fragment_code(module, decl.kind, text);
            let lexed = Lexed::new(text);
            let references = if decl.kind == DeclKind::Enum {
                enum_references(&lexed)
            } else {
                lexed.references(0..lexed.len())
            };
            for reference in references {
                if !decl.declares(reference) {
                    walk.queue.push_back((module, reference.to_string()));
                }
            }
            walk.closure.fragments.push(Fragment {
                kind: decl.kind,
                names: decl.names.clone(),
                code,
                depth,
                module,
                position: decl.start,
            });
            return;
        }

        let Some((import, binding)) = source.scan.import_of(name) else {
            // Global or undeclared; nothing to inline.
            return;
        };
        let import = import.clone();
        let binding = binding.clone();

        match self.classifier.classify(&import.source) {
            ImportKind::Framework => {
                debug!("Dropping framework import '{name}' from '{}'", import.source);
            }
            ImportKind::Schema => add_package(&mut walk.closure.schema_imports, &import.source, &binding),
            ImportKind::External => {
                add_package(&mut walk.closure.external_imports, &import.source, &binding);
            }
            ImportKind::Local => self.follow_local(walk, module, depth, &import.source, &binding),
        }
    }

    fn follow_local(
        &mut self,
        walk: &mut Walk,
        module: ModuleId,
        depth: usize,
        specifier: &str,
        binding: &ImportBinding,
    ) {
        let name = binding.local();
        if depth >= self.max_local_depth {
            warn!(
                "Not following '{name}' from '{specifier}': local import depth limit ({}) reached",
                self.max_local_depth
            );
            walk.closure.unresolved.push(name.to_string());
            return;
        }
        let Some(target) = self.graph.resolve(module, specifier) else {
            warn!(
                "Cannot resolve local import '{specifier}' from {}",
                self.graph.module(module).path.display()
            );
            walk.closure.unresolved.push(name.to_string());
            return;
        };
        let target_depth = walk.depths.entry(target).or_insert(depth + 1);
        *target_depth = (*target_depth).min(depth + 1);
        let target_depth = *target_depth;

        let scan = &self.graph.module(target).scan;
        let position = self
            .graph
            .module(module)
            .scan
            .imports
            .iter()
            .position(|i| i.source == specifier)
            .unwrap_or_default();

        match binding {
            ImportBinding::Namespace(local) => {
                let members: Vec<(String, String)> = scan.exports.clone();
                for (_, target_name) in &members {
                    walk.queue.push_back((target, target_name.clone()));
                }
                let fields: Vec<String> = members
                    .iter()
                    .map(|(exported, target_name)| {
                        if exported == target_name {
                            exported.clone()
                        } else {
                            format!("{exported}: {target_name}")
                        }
                    })
                    .collect();
                walk.closure.fragments.push(Fragment {
                    kind: DeclKind::Instantiation,
                    names: vec![local.clone()],
                    code: format!("const {local} = {{ {} }};", fields.join(", ")),
                    depth,
                    module,
                    position,
                });
            }
            ImportBinding::Default(_) | ImportBinding::Named { .. } => {
                let exported = match binding {
                    ImportBinding::Named { imported, .. } => imported.as_str(),
                    _ => "default",
                };
                let Some(target_name) = scan
                    .exported(exported)
                    .or_else(|| scan.declaration(exported).map(|_| exported))
                    .map(str::to_string)
                else {
                    warn!("'{specifier}' has no export named '{exported}'");
                    walk.closure.unresolved.push(name.to_string());
                    return;
                };

                if target_name != name {
                    let kind = match scan.declaration(&target_name).map(|d| d.kind) {
                        Some(DeclKind::Instantiation) => DeclKind::Instantiation,
                        _ => DeclKind::Binding,
                    };
                    walk.closure.fragments.push(Fragment {
                        kind,
                        names: vec![name.to_string()],
                        code: format!("const {name} = {target_name};"),
                        depth,
                        module,
                        position,
                    });
                }
                debug!(
                    "Following '{name}' into {} (depth {target_depth})",
                    self.graph.module(target).path.display()
                );
                walk.queue.push_back((target, target_name));
            }
        }
    }

    /// Fragment text with type-only syntax removed; classes extending a
    /// framework type lose the `extends` clause.
    fn fragment_code(&self, module: ModuleId, kind: DeclKind, text: &str) -> String {
        if kind != DeclKind::Class {
            return strip_types(text);
        }
        let scan = &self.graph.module(module).scan;
        let lexed = Lexed::new(text);
        let framework_bases: Vec<&str> = (0..lexed.len())
            .filter(|&i| lexed.is_ident(i, "extends"))
            .filter_map(|i| lexed.ident(i + 1))
            .filter(|base| {
                scan.import_of(base).is_some_and(|(import, _)| {
                    self.classifier.classify(&import.source) == ImportKind::Framework
                })
            })
            .collect();
        if framework_bases.is_empty() {
            strip_types(text)
        } else {
            strip_types(&remove_base_class(text, &framework_bases))
        }
    }
}

fn add_package(imports: &mut Vec<PackageImport>, package: &str, binding: &ImportBinding) {
    if let Some(existing) = imports.iter_mut().find(|p| p.package == package) {
        existing.add(binding);
    } else {
        imports.push(PackageImport {
            package: package.to_string(),
            bindings: vec![binding.clone()],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn classifier() -> ImportClassifier {
        ImportClassifier::new(vec!["lua-cli".to_string()], vec!["zod".to_string()])
    }

    fn resolve_in_memory(source: &str, body: &str) -> Closure {
        let mut graph = ModuleGraph::new();
        let root = graph.add("/project/src/index.ts", source);
        let classifier = classifier();
        ClosureResolver::new(&mut graph, &classifier, 1).resolve(root, body, &["input"])
    }

    fn codes(closure: &Closure) -> Vec<&str> {
        closure.fragments.iter().map(|f| f.code.as_str()).collect()
    }

    #[test]
    fn test_class_and_instantiation_in_order() {
        let src = "class WeatherService {\n  async getWeather(city: string) { return { weather: 'sunny', city }; }\n}\nconst weatherService = new WeatherService();\n";
        let closure = resolve_in_memory(src, "return weatherService.getWeather(input.city);");
        assert_eq!(
            codes(&closure),
            vec![
                "class WeatherService {\n  async getWeather(city) { return { weather: 'sunny', city }; }\n}",
                "const weatherService = new WeatherService();",
            ]
        );
    }

    #[test]
    fn test_unreferenced_declarations_are_not_included() {
        let src = "function used() { return 1; }\nfunction unused() { return 2; }\nconst other = 3;";
        let closure = resolve_in_memory(src, "return used();");
        assert_eq!(codes(&closure), vec!["function used() { return 1; }"]);
    }

    #[test]
    fn test_transitive_helper_is_included() {
        let src = "const BASE = 'https://api';\nfunction url(p: string) { return BASE + p; }\nclass Client { get(p) { return url(p); } }\nconst client = new Client();";
        let closure = resolve_in_memory(src, "return client.get('/x');");
        assert_eq!(
            codes(&closure),
            vec![
                "class Client { get(p) { return url(p); } }",
                "function url(p) { return BASE + p; }",
                "const BASE = 'https://api';",
                "const client = new Client();",
            ]
        );
    }

    #[test]
    fn test_bindings_and_instantiations_keep_source_order() {
        let src = "class Api { get(p) { return p; } }\nconst api = new Api();\nconst get = api.get.bind(api);";
        let closure = resolve_in_memory(src, "return get(input.path);");
        assert_eq!(
            codes(&closure),
            vec![
                "class Api { get(p) { return p; } }",
                "const api = new Api();",
                "const get = api.get.bind(api);",
            ]
        );
    }

    #[test]
    fn test_enum_is_lowered_and_emitted_first() {
        let src = "const Low = 'shadowed';\nconst BASE = 10;\nfunction label(l: Level) { return Level[l]; }\nenum Level { Low = BASE, High }";
        let closure = resolve_in_memory(src, "return label(Level.High);");
        assert_eq!(
            codes(&closure),
            vec![
                "const Level = Object.freeze({ Low: (BASE), High: ((BASE) + 1), [(BASE)]: \"Low\", [((BASE) + 1)]: \"High\" });",
                "function label(l) { return Level[l]; }",
                "const BASE = 10;",
            ]
        );
        assert_eq!(closure.fragments[0].kind, DeclKind::Enum);
    }

    #[test]
    fn test_property_names_are_not_references() {
        let src = "const city = 'x';\nconst format = (v) => v;";
        let closure = resolve_in_memory(src, "return input.city?.format;");
        assert!(closure.fragments.is_empty());
    }

    #[test]
    fn test_parameter_shadowing_top_level_name_is_excluded() {
        let closure = resolve_in_memory("const input = 1;", "return input;");
        assert!(closure.fragments.is_empty());
    }

    #[test]
    fn test_import_classification_and_dedup() {
        let src = "import { z } from 'zod';\nimport axios from 'axios';\nimport { get, post as send } from 'axios';\nimport { LuaTool } from 'lua-cli';\nconst Schema = z.object({ a: z.string() });";
        let closure = resolve_in_memory(
            src,
            "Schema.parse(input); await axios.get('u'); await get('u'); await send('u'); await axios.put('u'); return LuaTool;",
        );
        assert_eq!(closure.schema_imports.len(), 1);
        assert_eq!(closure.schema_imports[0].package, "zod");
        assert_eq!(closure.external_imports.len(), 1);
        let axios = &closure.external_imports[0];
        assert_eq!(axios.package, "axios");
        let locals: Vec<&str> = axios.bindings.iter().map(ImportBinding::local).collect();
        assert_eq!(locals, vec!["axios", "get", "send"]);
        assert_eq!(codes(&closure), vec!["const Schema = z.object({ a: z.string() });"]);
    }

    #[test]
    fn test_declarations_are_included_once() {
        let src = "class A {}\nconst a1 = new A();\nconst a2 = new A();";
        let closure = resolve_in_memory(src, "return [a1, a2, new A()];");
        assert_eq!(codes(&closure), vec!["class A {}", "const a1 = new A();", "const a2 = new A();"]);
    }

    #[test]
    fn test_local_import_is_followed() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = dir.path().join("src");
        fs::create_dir_all(src_dir.join("services")).unwrap();
        fs::write(
            src_dir.join("services/weather.ts"),
            "import axios from 'axios';\nexport default class WeatherService {\n  async get(city: string) { return (await axios.get('/w?c=' + city)).data; }\n}\n",
        )
        .unwrap();
        let index = src_dir.join("index.ts");
        fs::write(
            &index,
            "import Weather from './services/weather';\nconst service = new Weather();\n",
        )
        .unwrap();

        let mut graph = ModuleGraph::new();
        let root = graph.load(&index).unwrap();
        let classifier = classifier();
        let closure = ClosureResolver::new(&mut graph, &classifier, 1).resolve(
            root,
            "return service.get(input.city);",
            &["input"],
        );

        assert_eq!(
            codes(&closure),
            vec![
                "class WeatherService {\n  async get(city) { return (await axios.get('/w?c=' + city)).data; }\n}",
                "const Weather = WeatherService;",
                "const service = new Weather();",
            ]
        );
        assert_eq!(closure.external_imports[0].package, "axios");
        assert!(closure.unresolved.is_empty());
    }

    #[test]
    fn test_depth_limit_stops_following() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "import { b } from './b';\nexport const a = () => b;").unwrap();
        fs::write(dir.path().join("b.ts"), "export const b = 1;").unwrap();
        let index = dir.path().join("index.ts");
        fs::write(&index, "import { a } from './a';").unwrap();

        let mut graph = ModuleGraph::new();
        let root = graph.load(&index).unwrap();
        let classifier = classifier();
        let closure = ClosureResolver::new(&mut graph, &classifier, 1).resolve(root, "return a();", &[]);

        assert_eq!(codes(&closure), vec!["const a = () => b;"]);
        assert_eq!(closure.unresolved, vec!["b".to_string()]);
    }

    #[test]
    fn test_missing_local_module_is_unresolved() {
        let closure = resolve_in_memory("import { helper } from './missing';", "return helper();");
        assert!(closure.fragments.is_empty());
        assert_eq!(closure.unresolved, vec!["helper".to_string()]);
    }

    #[test]
    fn test_framework_base_class_is_dropped() {
        let src = "import { LuaTool } from 'lua-cli';\nclass T extends LuaTool {\n  constructor() { super(); this.name = 't'; }\n}";
        let closure = resolve_in_memory(src, "return new T();");
        assert_eq!(
            codes(&closure),
            vec!["class T {\n  constructor() {  this.name = 't'; }\n}"]
        );
    }

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize(Path::new("/p/src/./tools/../services/w.ts")),
            PathBuf::from("/p/src/services/w.ts")
        );
    }

    #[test]
    fn test_candidate_paths_swap_js_for_ts() {
        let candidates = candidate_paths(Path::new("/p/src/util.js"));
        assert_eq!(candidates[0], PathBuf::from("/p/src/util.ts"));

        let candidates = candidate_paths(Path::new("/p/src/util"));
        assert_eq!(candidates[0], PathBuf::from("/p/src/util.ts"));
        assert!(candidates.contains(&PathBuf::from("/p/src/util/index.ts")));
    }
}
