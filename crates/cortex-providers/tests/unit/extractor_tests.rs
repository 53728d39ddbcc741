//! Language extractor tests
//!
//! One module per language, each driving the extractor through a small but
//! representative source file and checking all three tiers.

use cortex_domain::entities::{Extraction, SymbolKind};
use cortex_providers::language::{Extractor, ExtractorSet};

fn extract(extractor: &dyn Extractor, path: &str, source: &str) -> Extraction {
    extractor
        .extract(path, source)
        .expect("extraction failed")
        .expect("no parse tree")
}

fn type_names(extraction: &Extraction) -> Vec<&str> {
    extraction.types.iter().map(|t| t.name.as_str()).collect()
}

fn function_names(extraction: &Extraction) -> Vec<&str> {
    extraction
        .functions
        .iter()
        .map(|f| f.name.as_str())
        .collect()
}

fn signature_of<'a>(extraction: &'a Extraction, name: &str) -> &'a str {
    &extraction
        .functions
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no function {name}"))
        .signature
}

mod registry {
    use super::*;
    use cortex_domain::value_objects::Language;

    #[test]
    fn test_dispatch_by_extension() {
        let set = ExtractorSet::new();
        assert_eq!(set.for_path("a/b.go").map(|e| e.language()), Some(Language::Go));
        assert_eq!(set.for_path("x.rb").map(|e| e.language()), Some(Language::Ruby));
        assert!(set.for_path("notes.md").is_none());
        assert!(set.for_path("Makefile").is_none());
    }

    #[test]
    fn test_javascript_reports_its_own_tag() {
        let set = ExtractorSet::new();
        assert_eq!(
            set.for_path("app.js").map(|e| e.language()),
            Some(Language::JavaScript)
        );
        assert_eq!(
            set.for_path("app.ts").map(|e| e.language()),
            Some(Language::TypeScript)
        );
    }

    #[test]
    fn test_unsupported_extension_extracts_nothing() {
        let set = ExtractorSet::new();
        assert!(set.extract("data.bin", "whatever").unwrap().is_none());
    }
}

mod go {
    use super::*;
    use cortex_providers::language::GoExtractor;

    const SOURCE: &str = r#"package main

import (
	"fmt"
	"os"
)

const MaxRetries int = 3

var logLevel = "info"

type Server struct {
	Addr string
}

type Handler interface {
	Handle() error
}

func main() {
	fmt.Println(os.Args)
}

func (s *Server) Start(port int) error {
	return nil
}
"#;

    #[test]
    fn test_symbols_tier() {
        let e = extract(&GoExtractor::new(), "main.go", SOURCE);
        assert_eq!(e.package.as_deref(), Some("main"));
        assert_eq!(e.imports_count, 2);
        assert_eq!(type_names(&e), vec!["Server", "Handler"]);
        assert_eq!(e.types[0].kind, SymbolKind::Struct);
        assert_eq!(e.types[1].kind, SymbolKind::Interface);
        assert_eq!(function_names(&e), vec!["main", "Start"]);
    }

    #[test]
    fn test_method_receiver_prefix() {
        let e = extract(&GoExtractor::new(), "main.go", SOURCE);
        assert_eq!(signature_of(&e, "Start"), "(Server) Start(port int) error");
        let start = e.functions.iter().find(|f| f.name == "Start").unwrap();
        assert_eq!(start.kind, SymbolKind::Method);
    }

    #[test]
    fn test_definitions_tier() {
        let e = extract(&GoExtractor::new(), "main.go", SOURCE);
        let server = e.definitions.iter().find(|d| d.name == "Server").unwrap();
        assert!(server.code.contains("type Server struct"));
        assert!(server.code.contains("Addr string"));
        assert!(server.end_line > server.start_line);

        let main = e.definitions.iter().find(|d| d.name == "main").unwrap();
        assert_eq!(main.code, "func main() { ... }");
        assert_eq!(main.start_line, main.end_line);
    }

    #[test]
    fn test_data_tier() {
        let e = extract(&GoExtractor::new(), "main.go", SOURCE);
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "MaxRetries");
        assert_eq!(e.constants[0].type_text, "int");
        assert_eq!(e.constants[0].value, "3");
        assert_eq!(e.variables.len(), 1);
        assert_eq!(e.variables[0].name, "logLevel");
        assert_eq!(e.variables[0].value, "\"info\"");
    }

    #[test]
    fn test_line_numbers_are_one_indexed() {
        let e = extract(&GoExtractor::new(), "main.go", "package main\n");
        assert!(e.types.is_empty());
        let e = extract(&GoExtractor::new(), "main.go", SOURCE);
        let server = &e.types[0];
        assert_eq!(server.start_line, 12);
        assert_eq!(server.end_line, 14);
    }
}

mod typescript {
    use super::*;
    use cortex_providers::language::TypeScriptExtractor;

    const SOURCE: &str = r#"import { readFile } from "fs";
import * as path from "path";

export interface Config {
  root: string;
}

type Alias = string | number;

enum Mode { Fast, Slow }

export class Watcher {
  start(): void {}
}

export function resolve(name: string): Config {
  return { root: name };
}

const MAX_DEPTH: number = 8;
let counter = 0;
var legacy = true;
"#;

    #[test]
    fn test_types_and_imports() {
        let e = extract(&TypeScriptExtractor::new(), "app.ts", SOURCE);
        assert_eq!(e.imports_count, 2);
        assert_eq!(type_names(&e), vec!["Config", "Alias", "Mode", "Watcher"]);
        let kinds: Vec<SymbolKind> = e.types.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SymbolKind::Interface,
                SymbolKind::Type,
                SymbolKind::Enum,
                SymbolKind::Class
            ]
        );
    }

    #[test]
    fn test_only_top_level_functions() {
        let e = extract(&TypeScriptExtractor::new(), "app.ts", SOURCE);
        // Class methods are not extracted for TypeScript
        assert_eq!(function_names(&e), vec!["resolve"]);
        assert_eq!(signature_of(&e, "resolve"), "resolve(name: string): Config");
    }

    #[test]
    fn test_const_vs_let_vs_var() {
        let e = extract(&TypeScriptExtractor::new(), "app.ts", SOURCE);
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "MAX_DEPTH");
        let var_names: Vec<&str> = e.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(var_names, vec!["counter", "legacy"]);
    }
}

mod javascript {
    use super::*;
    use cortex_providers::language::JavaScriptExtractor;

    #[test]
    fn test_delegates_to_typescript_grammar() {
        let source = "const LIMIT = 10;\nfunction run(x) { return x; }\n";
        let e = extract(&JavaScriptExtractor::new(), "run.js", source);
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "LIMIT");
        assert_eq!(function_names(&e), vec!["run"]);
        assert_eq!(signature_of(&e, "run"), "run(x)");
    }
}

mod python {
    use super::*;
    use cortex_providers::language::PythonExtractor;

    const SOURCE: &str = r#"import os
from typing import Optional

MAX_SIZE = 1024
default_name = "cortex"

class Parser:
    def parse(self, text: str) -> dict:
        return {}

    def _helper(self):
        def inner():
            return 1
        return inner

def top_level(x: int) -> int:
    return x
"#;

    #[test]
    fn test_methods_from_class_bodies() {
        let e = extract(&PythonExtractor::new(), "parser.py", SOURCE);
        assert_eq!(e.imports_count, 2);
        assert_eq!(type_names(&e), vec!["Parser"]);
        assert_eq!(function_names(&e), vec!["parse", "_helper", "top_level"]);
        assert_eq!(
            signature_of(&e, "parse"),
            "Parser.parse(self, text: str) -> dict"
        );
    }

    #[test]
    fn test_nested_functions_suppressed() {
        let e = extract(&PythonExtractor::new(), "parser.py", SOURCE);
        assert!(!function_names(&e).contains(&"inner"));
    }

    #[test]
    fn test_all_caps_assignment_is_constant() {
        let e = extract(&PythonExtractor::new(), "parser.py", SOURCE);
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "MAX_SIZE");
        assert_eq!(e.constants[0].value, "1024");
        assert_eq!(e.variables.len(), 1);
        assert_eq!(e.variables[0].name, "default_name");
    }
}

mod rust_lang {
    use super::*;
    use cortex_providers::language::RustExtractor;

    const SOURCE: &str = r#"use std::collections::HashMap;

pub const MAX_ENTRIES: usize = 64;
static DEFAULT_NAME: &str = "cortex";

pub struct Cache {
    entries: HashMap<String, String>,
}

pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
}

impl Cache {
    pub fn insert(&mut self, key: String) -> bool {
        true
    }
}

pub fn new_cache() -> Cache {
    Cache { entries: HashMap::new() }
}
"#;

    #[test]
    fn test_types_and_traits() {
        let e = extract(&RustExtractor::new(), "cache.rs", SOURCE);
        assert_eq!(e.imports_count, 1);
        assert_eq!(type_names(&e), vec!["Cache", "Storage"]);
        assert_eq!(e.types[0].kind, SymbolKind::Struct);
        assert_eq!(e.types[1].kind, SymbolKind::Trait);
    }

    #[test]
    fn test_impl_methods_carry_type_prefix() {
        let e = extract(&RustExtractor::new(), "cache.rs", SOURCE);
        assert_eq!(
            signature_of(&e, "insert"),
            "Cache::insert(&mut self, key: String) -> bool"
        );
        assert_eq!(signature_of(&e, "new_cache"), "new_cache() -> Cache");
    }

    #[test]
    fn test_const_and_static() {
        let e = extract(&RustExtractor::new(), "cache.rs", SOURCE);
        assert_eq!(e.constants[0].name, "MAX_ENTRIES");
        assert_eq!(e.constants[0].type_text, "usize");
        assert_eq!(e.variables[0].name, "DEFAULT_NAME");
    }
}

mod c_family {
    use super::*;
    use cortex_providers::language::CFamilyExtractor;
    use cortex_domain::value_objects::Language;

    const C_SOURCE: &str = r#"#include <stdio.h>
#include "util.h"

const int MAX_RETRIES = 3;
int counter = 0;

struct Point {
    int x;
    int y;
};

int add(int a, int b) {
    return a + b;
}
"#;

    #[test]
    fn test_c_extraction() {
        let e = extract(&CFamilyExtractor::c(), "math.c", C_SOURCE);
        assert_eq!(e.imports_count, 2);
        assert!(type_names(&e).contains(&"Point"));
        assert_eq!(signature_of(&e, "add"), "int add(int a, int b)");
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "MAX_RETRIES");
        assert_eq!(e.variables.len(), 1);
        assert_eq!(e.variables[0].name, "counter");
    }

    const CPP_SOURCE: &str = r#"#include <vector>

namespace core {

class Engine {
public:
    int run();
};

enum Color { Red, Green };

}

int make_total(int n) {
    return n;
}
"#;

    #[test]
    fn test_cpp_namespace_contents_are_top_level() {
        let e = extract(&CFamilyExtractor::cpp(), "engine.cpp", CPP_SOURCE);
        assert!(type_names(&e).contains(&"Engine"));
        assert!(type_names(&e).contains(&"Color"));
        assert_eq!(signature_of(&e, "make_total"), "int make_total(int n)");
    }

    #[test]
    fn test_language_tags_differ_by_extension() {
        assert_eq!(CFamilyExtractor::c().language(), Language::C);
        assert_eq!(CFamilyExtractor::cpp().language(), Language::Cpp);
    }
}

mod java {
    use super::*;
    use cortex_providers::language::JavaExtractor;

    const SOURCE: &str = r#"package com.example.app;

import java.util.List;
import java.util.Map;

public class Service {
    public static final int MAX_RETRIES = 3;
    private static String region = "us";
    private int instanceField = 0;

    public List<String> names(Map<String, String> input) {
        return null;
    }
}

interface Greeter {
    String greet(String name);
}
"#;

    #[test]
    fn test_package_and_imports() {
        let e = extract(&JavaExtractor::new(), "Service.java", SOURCE);
        assert_eq!(e.package.as_deref(), Some("com.example.app"));
        assert_eq!(e.imports_count, 2);
        assert_eq!(type_names(&e), vec!["Service", "Greeter"]);
    }

    #[test]
    fn test_method_signatures_qualified_by_class() {
        let e = extract(&JavaExtractor::new(), "Service.java", SOURCE);
        assert_eq!(
            signature_of(&e, "names"),
            "Service.names(Map<String, String> input): List<String>"
        );
        assert_eq!(
            signature_of(&e, "greet"),
            "Greeter.greet(String name): String"
        );
    }

    #[test]
    fn test_static_fields_only() {
        let e = extract(&JavaExtractor::new(), "Service.java", SOURCE);
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "MAX_RETRIES");
        assert_eq!(e.variables.len(), 1);
        assert_eq!(e.variables[0].name, "region");
        // Instance fields are deliberately not extracted
    }
}

mod php {
    use super::*;
    use cortex_providers::language::PhpExtractor;

    const SOURCE: &str = r#"<?php
namespace App\Core;

use App\Util\Logger;

const VERSION = "1.0";

class Router {
    const MAX_ROUTES = 100;

    public function dispatch($path) {
        return $path;
    }
}

interface Handler {
    public function handle($request);
}

function helper($x) {
    return $x;
}
"#;

    #[test]
    fn test_namespace_and_uses() {
        let e = extract(&PhpExtractor::new(), "router.php", SOURCE);
        assert_eq!(e.package.as_deref(), Some("App\\Core"));
        assert_eq!(e.imports_count, 1);
        assert_eq!(type_names(&e), vec!["Router", "Handler"]);
        assert_eq!(e.types[1].kind, SymbolKind::Interface);
    }

    #[test]
    fn test_method_arrow_signatures() {
        let e = extract(&PhpExtractor::new(), "router.php", SOURCE);
        assert_eq!(signature_of(&e, "dispatch"), "Router->dispatch($path)");
        assert_eq!(signature_of(&e, "handle"), "Handler->handle($request)");
        assert_eq!(signature_of(&e, "helper"), "helper($x)");
    }

    #[test]
    fn test_class_and_top_level_constants() {
        let e = extract(&PhpExtractor::new(), "router.php", SOURCE);
        let names: Vec<&str> = e.constants.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"VERSION"));
        assert!(names.contains(&"MAX_ROUTES"));
        let max = e.constants.iter().find(|c| c.name == "MAX_ROUTES").unwrap();
        assert_eq!(max.value, "100");
    }
}

mod ruby {
    use super::*;
    use cortex_providers::language::RubyExtractor;

    const SOURCE: &str = r#"require "json"
require_relative "helper"

VERSION = "1.0"
$debug = false

class Parser
  def parse(text)
    text
  end

  def self.default
    Parser.new
  end
end

module Util
  def self.clamp(x)
    x
  end
end

def top_level(arg)
  arg
end
"#;

    #[test]
    fn test_requires_count_as_imports() {
        let e = extract(&RubyExtractor::new(), "parser.rb", SOURCE);
        assert_eq!(e.imports_count, 2);
    }

    #[test]
    fn test_classes_and_modules() {
        let e = extract(&RubyExtractor::new(), "parser.rb", SOURCE);
        assert_eq!(type_names(&e), vec!["Parser", "Util"]);
        assert_eq!(e.types[0].kind, SymbolKind::Class);
        assert_eq!(e.types[1].kind, SymbolKind::Module);
    }

    #[test]
    fn test_method_scoping_separators() {
        let e = extract(&RubyExtractor::new(), "parser.rb", SOURCE);
        assert_eq!(signature_of(&e, "parse"), "Parser#parse(text)");
        assert_eq!(signature_of(&e, "default"), "Parser.default()");
        assert_eq!(signature_of(&e, "clamp"), "Util.clamp(x)");
        assert_eq!(signature_of(&e, "top_level"), "top_level(arg)");
    }

    #[test]
    fn test_constants_and_globals() {
        let e = extract(&RubyExtractor::new(), "parser.rb", SOURCE);
        assert_eq!(e.constants.len(), 1);
        assert_eq!(e.constants[0].name, "VERSION");
        assert_eq!(e.variables.len(), 1);
        assert_eq!(e.variables[0].name, "$debug");
    }
}
