use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;

pub mod grammar;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GrammarError {
    #[error("Expected `TypeName : type name, ...` but found no `:` in {0:?}")]
    MissingColon(String),
    #[error("Missing type name in {0:?}")]
    MissingTypeName(String),
    #[error("Expected `type name` but found {field:?} in rule {rule}")]
    MalformedField { rule: String, field: String },
    #[error("`{0}` can't be used as a field name")]
    ReservedFieldName(String),
}

#[derive(thiserror::Error, Debug)]
pub enum GeneratorError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("Failed to write {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Rust keywords that are legal as raw identifiers, and what a constructor parameter with
/// that name is called instead.
const KEYWORDS: &[(&str, &str)] = &[
    ("as", "alias"),
    ("async", "is_async"),
    ("box", "boxed"),
    ("const", "constant"),
    ("dyn", "dynamic"),
    ("enum", "enumeration"),
    ("extern", "external"),
    ("fn", "function"),
    ("impl", "implementation"),
    ("in", "input"),
    ("let", "binding"),
    ("loop", "body"),
    ("match", "matched"),
    ("mod", "module"),
    ("move", "moved"),
    ("mut", "mutable"),
    ("pub", "public"),
    ("ref", "reference"),
    ("static", "is_static"),
    ("struct", "structure"),
    ("trait", "tr"),
    ("type", "ty"),
    ("use", "usage"),
    ("where", "clause"),
];

/// Keywords that can't even be raw identifiers.
const FORBIDDEN: &[&str] = &["self", "Self", "super", "crate", "_"];

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub ty: String,
    pub name: String,
}

impl Field {
    /// The field and accessor name, escaped if it's a keyword.
    fn ident(&self) -> String {
        if KEYWORDS.iter().any(|(keyword, _)| *keyword == self.name) {
            format!("r#{}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// The constructor parameter name, substituted if it's a keyword.
    fn param(&self) -> &str {
        match KEYWORDS.iter().find(|(keyword, _)| *keyword == self.name) {
            Some((_, substitute)) => *substitute,
            None => self.name.as_str(),
        }
    }

    fn initializer(&self) -> String {
        if self.ident() == self.param() {
            self.param().to_string()
        } else {
            format!("{}: {}", self.ident(), self.param())
        }
    }

    /// Accessors hand out `&T` for a `Box<T>` field.
    fn accessor_type(&self) -> &str {
        self.ty
            .strip_prefix("Box<")
            .and_then(|ty| ty.strip_suffix('>'))
            .unwrap_or(self.ty.as_str())
    }
}

/// One line of a grammar description: `TypeName : type1 name1, type2 name2, ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub type_name: String,
    pub fields: Vec<Field>,
}

impl FromStr for Rule {
    type Err = GrammarError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (type_name, fields) =
            line.split_once(':').ok_or_else(|| GrammarError::MissingColon(line.to_string()))?;

        let type_name = type_name.trim();
        if type_name.is_empty() {
            return Err(GrammarError::MissingTypeName(line.to_string()));
        }

        let fields = fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(|field| match field.split_whitespace().collect_vec()[..] {
                [_, name] if FORBIDDEN.contains(&name) => {
                    Err(GrammarError::ReservedFieldName(name.to_string()))
                }
                [ty, name] => Ok(Field { ty: ty.to_string(), name: name.to_string() }),
                _ => Err(GrammarError::MalformedField {
                    rule: type_name.to_string(),
                    field: field.to_string(),
                }),
            })
            .collect::<Result<_, _>>()?;

        Ok(Rule { type_name: type_name.to_string(), fields })
    }
}

/// Collects generated lines and indents them by brace depth.
#[derive(Debug, Default)]
struct SourceWriter {
    lines: Vec<String>,
}

impl SourceWriter {
    fn line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn finish(self) -> String {
        const TAB: &str = "    ";
        let mut depth = 0usize;
        let mut output = String::new();

        for line in self.lines {
            if line.starts_with('}') {
                depth = depth.saturating_sub(1);
            }
            if !line.is_empty() {
                output.push_str(&TAB.repeat(depth));
            }
            output.push_str(&line);
            output.push('\n');
            if line.ends_with('{') {
                depth += 1;
            }
        }

        output
    }
}

fn snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Generates the node model for `base_name` from grammar `rules`.
///
/// `uses` are emitted as `use` declarations at the top of the file. The output only depends
/// on the inputs, so the same grammar always produces the same bytes.
pub fn define_ast(base_name: &str, uses: &[&str], rules: &[&str]) -> Result<String, GrammarError> {
    let rules = rules.iter().map(|rule| rule.parse()).collect::<Result<Vec<Rule>, _>>()?;
    log::debug!("Generating {} with {} variants", base_name, rules.len());

    let mut w = SourceWriter::default();
    w.line("// Generated by ast_generator, do not modify.");
    for path in uses {
        w.line(format!("use {path};"));
    }
    w.blank();

    define_visitor(&mut w, base_name, &rules);
    w.blank();
    define_base(&mut w, base_name, &rules);

    for rule in &rules {
        w.blank();
        define_type(&mut w, base_name, rule);
    }

    Ok(w.finish())
}

fn visit_method(base_name: &str, rule: &Rule) -> String {
    format!("visit_{}_{}", snake_case(&rule.type_name), snake_case(base_name))
}

fn define_visitor(w: &mut SourceWriter, base_name: &str, rules: &[Rule]) {
    let param = snake_case(base_name);

    w.line("pub trait Visitor<T> {");
    for rule in rules {
        w.line(format!(
            "fn {}(&mut self, {param}: &{}{base_name}) -> T;",
            visit_method(base_name, rule),
            rule.type_name
        ));
    }
    w.line("}");
}

fn define_base(w: &mut SourceWriter, base_name: &str, rules: &[Rule]) {
    let param = snake_case(base_name);

    w.line("#[derive(Debug, Clone, PartialEq)]");
    w.line(format!("pub enum {base_name} {{"));
    for rule in rules {
        w.line(format!("{}({}{base_name}),", rule.type_name, rule.type_name));
    }
    w.line("}");
    w.blank();

    w.line(format!("impl {base_name} {{"));
    w.line("pub fn accept<T>(&self, visitor: &mut dyn Visitor<T>) -> T {");
    w.line("match self {");
    for rule in rules {
        w.line(format!("{base_name}::{}({param}) => {param}.accept(visitor),", rule.type_name));
    }
    w.line("}");
    w.line("}");
    w.line("}");
}

fn define_type(w: &mut SourceWriter, base_name: &str, rule: &Rule) {
    let struct_name = format!("{}{base_name}", rule.type_name);
    let param = snake_case(base_name);

    w.line("#[derive(Debug, Clone, PartialEq)]");
    w.line(format!("pub struct {struct_name} {{"));
    for field in &rule.fields {
        w.line(format!("{}: {},", field.ident(), field.ty));
    }
    w.line("}");
    w.blank();

    w.line(format!("impl {struct_name} {{"));

    let params = rule.fields.iter().map(|f| format!("{}: {}", f.param(), f.ty)).join(", ");
    let initializers = rule.fields.iter().map(Field::initializer).join(", ");
    w.line(format!("pub fn new({params}) -> Self {{"));
    if initializers.is_empty() {
        w.line("Self {}");
    } else {
        w.line(format!("Self {{ {initializers} }}"));
    }
    w.line("}");

    for field in &rule.fields {
        w.blank();
        w.line(format!("pub fn {}(&self) -> &{} {{", field.ident(), field.accessor_type()));
        w.line(format!("&self.{}", field.ident()));
        w.line("}");
    }

    w.blank();
    w.line("pub fn accept<T>(&self, visitor: &mut dyn Visitor<T>) -> T {");
    w.line(format!("visitor.{}(self)", visit_method(base_name, rule)));
    w.line("}");
    w.line("}");
    w.blank();

    w.line(format!("impl From<{struct_name}> for {base_name} {{"));
    w.line(format!("fn from({param}: {struct_name}) -> Self {{"));
    w.line(format!("{base_name}::{}({param})", rule.type_name));
    w.line("}");
    w.line("}");
}

/// Writes the generated node model to `<output_dir>/ast/<base_name>.rs` and returns its path.
pub fn generate_file(
    output_dir: &Path,
    base_name: &str,
    uses: &[&str],
    rules: &[&str],
) -> Result<PathBuf, GeneratorError> {
    let source = define_ast(base_name, uses, rules)?;

    let folder = output_dir.join("ast");
    fs::create_dir_all(&folder)
        .map_err(|source| GeneratorError::Io { path: folder.clone(), source })?;

    let path = folder.join(format!("{}.rs", snake_case(base_name)));
    fs::write(&path, source).map_err(|source| GeneratorError::Io { path: path.clone(), source })?;

    Ok(path)
}
