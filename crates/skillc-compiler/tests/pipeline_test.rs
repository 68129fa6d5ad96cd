//! End-to-end tests for the compile pipeline.
//!
//! Each test writes a small project into a temporary directory, compiles it
//! with a stub bundler and inspects the written manifest:
//! - inline tools with primitive schemas
//! - local classes and instantiations inlined in order
//! - schema passthrough plus bundled or fallback packages
//! - per-tool package copies
//! - class-based tools importing local services
//! - enums, arrow type parameters and binding order
//! - skip-not-crash and idempotent output
//!
//! When `node` is on `PATH`, execute strings are also run with only the
//! globals the execution contract grants; otherwise those checks are
//! skipped.

use async_trait::async_trait;
use serde_json::json;
use skillc_compiler::bundler::{BundleRequest, Bundler};
use skillc_compiler::{
    CompileOptions, ScaffoldOptions, SkillCompiler, TemplateEngine, load_manifest, scaffold_project,
};
use skillc_core::{DeployManifest, Error, ProjectConfig, Result, SkillName};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const DESCRIPTOR: &str = r#"[skill]
name = "weather-skill"
version = "0.2.0"
entry = "src/index.ts"
"#;

/// Bundler that wraps the package name in a tiny module, or fails for the
/// packages listed in `failing`.
#[derive(Debug, Default)]
struct StubBundler {
    calls: Arc<AtomicUsize>,
    failing: Vec<String>,
}

#[async_trait]
impl Bundler for StubBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&request.package) {
            return Err(Error::BundleFailed {
                package: request.package.clone(),
                message: "Could not resolve package".to_string(),
            });
        }
        Ok(format!(
            "module.exports = {{ bundled: '{}', get: async () => ({{ data: 'ok' }}) }};\n",
            request.package
        ))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn write_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("skill.toml"), DESCRIPTOR).unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn compiler(root: &Path, bundler: StubBundler) -> SkillCompiler {
    let config = ProjectConfig::load(root).unwrap();
    SkillCompiler::new(CompileOptions::from_config(&config, root))
        .unwrap()
        .with_bundler(Box::new(bundler))
}

async fn compile(root: &Path, bundler: StubBundler) -> DeployManifest {
    let report = compiler(root, bundler).compile().await.unwrap();
    load_manifest(&report.manifest_path).unwrap()
}

/// Evaluates the execute string in a fresh context holding the granted
/// globals, calls it with `argv[3]` and prints the JSON result.
const NODE_HARNESS: &str = r"const fs = require('fs');
const vm = require('vm');

// The host supplies the schema library; a permissive stand-in is enough.
const builder = new Proxy(function () {}, {
  get: (_, key) => (key === 'parse' ? (value) => value : builder),
  apply: () => builder,
});
const hostRequire = (name) => {
  if (name === 'zod') return { z: builder };
  throw new Error('Cannot find module ' + name);
};

const [, , file, input] = process.argv;
const context = vm.createContext({
  fetch, URLSearchParams, AbortController, setTimeout, clearTimeout, console, Buffer,
  require: hostRequire,
});
const execute = vm.runInContext('(' + fs.readFileSync(file, 'utf8') + ')', context);
Promise.resolve(execute(JSON.parse(input)))
  .then((result) => process.stdout.write(JSON.stringify(result)))
  .catch((error) => {
    console.error(error);
    process.exit(1);
  });
";

/// Runs `execute` under node; `None` when node is not installed.
async fn run_execute(execute: &str, input: &Value) -> Option<Value> {
    let Ok(node) = which::which("node") else {
        eprintln!("node not found on PATH; skipping execution check");
        return None;
    };
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("execute.js");
    let harness = dir.path().join("run.js");
    fs::write(&script, execute).unwrap();
    fs::write(&harness, NODE_HARNESS).unwrap();

    let output = tokio::process::Command::new(node)
        .arg(&harness)
        .arg(&script)
        .arg(input.to_string())
        .output()
        .await
        .unwrap();
    assert!(
        output.status.success(),
        "execute string failed under node:\n{}\n--- execute ---\n{execute}",
        String::from_utf8_lossy(&output.stderr)
    );
    Some(serde_json::from_slice(&output.stdout).unwrap())
}

const ECHO: &str = r"import { z } from 'zod';
import { registerTool } from 'lua-cli';

const EchoInput = z.object({ message: z.string() });
const EchoOutput = z.object({ response: z.string() });

registerTool({
  name: 'echo',
  description: 'Echoes the message back',
  inputSchema: EchoInput,
  outputSchema: EchoOutput,
  execute: async (input: { message: string }) => {
    return { response: input.message };
  },
});
";

#[tokio::test]
async fn test_inline_tool_with_primitive_schemas() {
    let dir = write_project(&[("src/index.ts", ECHO)]);
    let manifest = compile(dir.path(), StubBundler::default()).await;

    assert_eq!(manifest.version, "0.2.0");
    assert_eq!(manifest.skills_name, "weather-skill");
    assert_eq!(manifest.tool_count(), 1);

    let tool = manifest.tool("echo").unwrap();
    assert_eq!(
        serde_json::to_value(&tool.input_schema).unwrap(),
        json!({
            "type": "object",
            "properties": { "message": { "type": "string" } },
            "required": ["message"]
        })
    );
    assert_eq!(
        tool.execute,
        "async (input) => {\nreturn { response: input.message };\n}"
    );
    assert!(!tool.execute.contains("class "));
    assert_eq!(
        fs::read_to_string(dir.path().join(".skillc/echo.js")).unwrap(),
        tool.execute
    );

    if let Some(result) = run_execute(&tool.execute, &json!({ "message": "hi" })).await {
        assert_eq!(result, json!({ "response": "hi" }));
    }
}

#[tokio::test]
async fn test_local_class_precedes_its_instantiation() {
    let entry = r"import { z } from 'zod';

const Input = z.object({ city: z.string() });
const Output = z.object({ weather: z.string(), city: z.string() });

const weatherService = new WeatherService();

class WeatherService {
  async getWeather(city: string): Promise<Weather> {
    return { weather: 'sunny', city };
  }
}

class Unused {}

registerTool({
  name: 'weather',
  description: 'Gets the weather',
  inputSchema: Input,
  outputSchema: Output,
  execute: async (input) => {
    return weatherService.getWeather(input.city);
  },
});
";
    let dir = write_project(&[("src/index.ts", entry)]);
    let manifest = compile(dir.path(), StubBundler::default()).await;
    let execute = &manifest.tool("weather").unwrap().execute;

    let class_at = execute.find("class WeatherService {").unwrap();
    let new_at = execute.find("const weatherService = new WeatherService();").unwrap();
    assert!(class_at < new_at);
    assert!(execute.contains("async getWeather(city) {"));
    assert!(!execute.contains("class Unused"));
    assert!(!execute.contains("require('zod')"));
    assert_eq!(
        manifest.tool("weather").unwrap().output_schema.field_names(),
        vec!["weather", "city"]
    );

    if let Some(result) = run_execute(execute, &json!({ "city": "Paris" })).await {
        assert_eq!(result, json!({ "weather": "sunny", "city": "Paris" }));
    }
}

const HTTP_TOOL: &str = r"import { z } from 'zod';
import axios from 'axios';

const Input = z.object({ url: z.string() });
const Output = z.object({ ok: z.boolean(), detail: z.string() });

registerTool({
  name: 'fetch',
  description: 'Fetches a URL',
  inputSchema: Input,
  outputSchema: Output,
  execute: async (input) => {
    const url = z.string().parse(input.url);
    try {
      const res = await axios.get(url);
      return { ok: true, detail: String(res.data) };
    } catch (error) {
      return { ok: false, detail: error.message };
    }
  },
});
";

#[tokio::test]
async fn test_schema_passthrough_and_bundled_package() {
    let dir = write_project(&[("src/index.ts", HTTP_TOOL)]);
    let manifest = compile(dir.path(), StubBundler::default()).await;
    let execute = &manifest.tool("fetch").unwrap().execute;

    assert!(execute.starts_with(
        "async (input) => {\nconst { z } = require('zod');\nconst { axios } = (function () {"
    ));
    assert!(execute.contains("bundled: 'axios'"));
}

#[tokio::test]
async fn test_bundle_failure_falls_back_to_fetch_client() {
    let dir = write_project(&[("src/index.ts", HTTP_TOOL)]);
    let bundler = StubBundler {
        failing: vec!["axios".to_string()],
        ..StubBundler::default()
    };
    let manifest = compile(dir.path(), bundler).await;
    let execute = &manifest.tool("fetch").unwrap().execute;

    assert!(execute.contains("await fetch(url,"));
    assert!(execute.contains("'Request failed with status code '"));
    assert!(execute.contains("axios: interop"));
    assert!(execute.contains("} catch (error) {"));
}

#[tokio::test]
async fn test_fallback_client_rejects_like_axios() {
    let entry = r"import { z } from 'zod';
import axios from 'axios';

const Input = z.object({ url: z.string() });
const Output = z.object({ ok: z.boolean(), error: z.string() });

registerTool({
  name: 'ping',
  description: 'Requests a URL',
  inputSchema: Input,
  outputSchema: Output,
  execute: async (input) => {
    try {
      await axios.get(input.url, { timeout: 2000 });
      return { ok: true, error: '' };
    } catch (error) {
      return { ok: false, error: error.isAxiosError ? 'axios' : String(error) };
    }
  },
});
";
    let dir = write_project(&[("src/index.ts", entry)]);
    let bundler = StubBundler {
        failing: vec!["axios".to_string()],
        ..StubBundler::default()
    };
    let manifest = compile(dir.path(), bundler).await;
    let execute = &manifest.tool("ping").unwrap().execute;
    assert!(execute.contains("axios: interop"));

    // Nothing listens on the discard port, so the request fails fast.
    if let Some(result) = run_execute(execute, &json!({ "url": "http://127.0.0.1:9/" })).await {
        assert_eq!(result, json!({ "ok": false, "error": "axios" }));
    }
}

#[tokio::test]
async fn test_tools_sharing_a_package_bundle_independently() {
    let entry = r"import { z } from 'zod';
import axios from 'axios';

const Q = z.object({ q: z.string() });

registerTool({ name: 'first', description: 'one', inputSchema: Q, outputSchema: Q,
  execute: async (input) => (await axios.get('/a/' + input.q)).data });
registerTool({ name: 'second', description: 'two', inputSchema: Q, outputSchema: Q,
  execute: async (input) => (await axios.get('/b/' + input.q)).data });
";
    let dir = write_project(&[("src/index.ts", entry)]);
    let calls = Arc::new(AtomicUsize::new(0));
    let bundler = StubBundler {
        calls: Arc::clone(&calls),
        failing: Vec::new(),
    };
    let manifest = compile(dir.path(), bundler).await;

    assert_eq!(manifest.tool_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    for tool in &manifest.tools {
        assert_eq!(tool.execute.matches("bundled: 'axios'").count(), 1);
    }
    assert_eq!(
        manifest.tools[0].execute.replace("/a/", "/b/"),
        manifest.tools[1].execute
    );
}

#[tokio::test]
async fn test_class_tool_with_local_service_importing_package() {
    let index = r"import WeatherTool from './tools/WeatherTool';
import { registerTool } from 'lua-cli';

registerTool(new WeatherTool());
";
    let tool = r"import { z } from 'zod';
import { LuaTool } from 'lua-cli';
import { WeatherService } from '../services/WeatherService';

const WeatherInput = z.object({ city: z.string() });
const WeatherOutput = z.object({ weather: z.string() });

export default class WeatherTool extends LuaTool {
  constructor() {
    super();
    this.name = 'weather';
    this.description = 'Gets the weather for a city';
    this.inputSchema = WeatherInput;
    this.outputSchema = WeatherOutput;
  }

  async execute(input: { city: string }) {
    const service = new WeatherService();
    return service.lookup(input.city);
  }
}
";
    let service = r"import axios from 'axios';

export class WeatherService {
  async lookup(city: string) {
    const res = await axios.get(`https://weather.example/${city}`);
    return { weather: res.data };
  }
}
";
    let dir = write_project(&[
        ("src/index.ts", index),
        ("src/tools/WeatherTool.ts", tool),
        ("src/services/WeatherService.ts", service),
    ]);
    let manifest = compile(dir.path(), StubBundler::default()).await;
    let execute = &manifest.tool("weather").unwrap().execute;

    assert!(execute.contains("const { axios } = (function () {"));
    let service_at = execute.find("class WeatherService {").unwrap();
    let tool_at = execute.find("class WeatherTool {").unwrap();
    let call_at = execute
        .find("const toolInstance = new WeatherTool();\nreturn toolInstance.execute(input);")
        .unwrap();
    assert!(service_at < tool_at);
    assert!(tool_at < call_at);
    assert!(!execute.contains("super()"));
    assert!(!execute.contains("lua-cli"));

    if let Some(result) = run_execute(execute, &json!({ "city": "Oslo" })).await {
        assert_eq!(result, json!({ "weather": "ok" }));
    }
}

#[tokio::test]
async fn test_enums_generic_arrows_and_bound_methods() {
    let entry = r"import { z } from 'zod';

const Input = z.object({ city: z.string() });
const Output = z.object({
  unit: z.string(),
  level: z.number(),
  name: z.string(),
  city: z.string(),
});

enum Unit { C = 'celsius', F = 'fahrenheit' }
enum Level { Low, Mid = 5, High }
declare enum Ambient { Hidden }

const pick = <K extends string>(value: K): K => value;

class Api {
  shout(city: string): string {
    return city.toUpperCase();
  }
}
const api = new Api();
const shout = api.shout.bind(api);

registerTool({
  name: 'report',
  description: 'Reports a city in upper case',
  inputSchema: Input,
  outputSchema: Output,
  execute: async (input: { city: string }) => {
    const first = <T,>(items: T[]): T => items[0];
    return {
      unit: pick(Unit.C),
      level: Level.High,
      name: Level[Level.High],
      city: first([shout(input.city)]),
    };
  },
});
";
    let dir = write_project(&[("src/index.ts", entry)]);
    let manifest = compile(dir.path(), StubBundler::default()).await;
    let execute = &manifest.tool("report").unwrap().execute;

    assert!(execute.contains("const Unit = Object.freeze({ C: 'celsius', F: 'fahrenheit' });"));
    assert!(execute.contains("const pick = (value) => value;"));
    assert!(execute.contains("const first = (items) => items[0];"));
    assert!(!execute.contains("Ambient"));
    let level_at = execute.find("const Level = Object.freeze(").unwrap();
    let class_at = execute.find("class Api {").unwrap();
    let api_at = execute.find("const api = new Api();").unwrap();
    let shout_at = execute.find("const shout = api.shout.bind(api);").unwrap();
    assert!(level_at < class_at);
    assert!(class_at < api_at);
    assert!(api_at < shout_at);

    if let Some(result) = run_execute(execute, &json!({ "city": "Paris" })).await {
        assert_eq!(
            result,
            json!({ "unit": "celsius", "level": 6, "name": "High", "city": "PARIS" })
        );
    }
}

#[tokio::test]
async fn test_malformed_declaration_is_skipped() {
    let entry = format!(
        "{ECHO}\nregisterTool({{\n  name: 'broken',\n  inputSchema: EchoInput,\n  outputSchema: EchoOutput,\n  execute: async (input) => input,\n}});\n"
    );
    let dir = write_project(&[("src/index.ts", &entry)]);
    let report = compiler(dir.path(), StubBundler::default())
        .compile()
        .await
        .unwrap();

    assert_eq!(report.tools, vec!["echo"]);
    assert_eq!(report.skipped_count(), 1);
    assert!(report.skipped[0].reason.contains("description"));
    assert_eq!(load_manifest(&report.manifest_path).unwrap().tool_count(), 1);
}

#[tokio::test]
async fn test_recompiling_is_byte_identical() {
    let dir = write_project(&[("src/index.ts", HTTP_TOOL)]);
    let manifest_path = dir.path().join(".skillc/deploy.json");

    compile(dir.path(), StubBundler::default()).await;
    let first = fs::read(&manifest_path).unwrap();
    compile(dir.path(), StubBundler::default()).await;
    assert_eq!(fs::read(&manifest_path).unwrap(), first);
}

#[tokio::test]
async fn test_missing_descriptor_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = ProjectConfig::load(dir.path()).unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_scaffolded_project_compiles() {
    let dir = TempDir::new().unwrap();
    let templates = TemplateEngine::new().unwrap();
    scaffold_project(
        &templates,
        dir.path(),
        &ScaffoldOptions {
            name: SkillName::new("hello-skill").unwrap(),
            org_id: None,
            agent_id: None,
            force: false,
        },
    )
    .unwrap();

    let manifest = compile(dir.path(), StubBundler::default()).await;
    let names: Vec<&str> = manifest.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["echo", "greeting"]);

    let greeting = manifest.tool("greeting").unwrap();
    assert!(greeting.execute.contains("function greet(name) {"));
    assert!(greeting.execute.contains("class GreetingTool {"));
    assert_eq!(greeting.input_schema.field_names(), vec!["name"]);
}
