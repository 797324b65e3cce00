//! Template rendering for sprout.
//! The same renderer is used for directory names, file names and file
//! contents, so a run behaves identically on all three.

use crate::config::Delimiters;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::transforms::TransformRegistry;
use log::{debug, warn};
use minijinja::{syntax::SyntaxConfig, AutoEscape, Environment};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Registers a named template that other templates can `include` or
    /// `import`.
    ///
    /// # Errors
    /// * `Error::RenderError` if the template does not compile
    fn add_template(&mut self, name: &str, template: &str) -> Result<()>;

    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name reported in errors, usually the template path
    /// * `template` - Template string to render
    /// * `context` - Variables for rendering
    ///
    /// # Errors
    /// * `Error::RenderError` on invalid syntax, unknown transforms or
    ///   failing expressions
    fn render(&self, name: &str, template: &str, context: &Context) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Builds the environment once for a whole run.
    ///
    /// Only the transforms of `transforms` are available, both as filters
    /// (`{{ name|snake }}`) and as functions (`{{ snake(name) }}`).
    /// Delimiters that cannot form a syntax are replaced by the default pair
    /// with a warning.
    pub fn new(delimiters: &Delimiters, transforms: &TransformRegistry) -> Self {
        let mut env = Environment::empty();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        let syntax = syntax_for(delimiters).or_else(|e| {
            warn!(
                "Delimiters {} {} are not usable ({e}); falling back to the defaults",
                delimiters.left(),
                delimiters.right()
            );
            syntax_for(&Delimiters::default())
        });
        match syntax {
            Ok(syntax) => env.set_syntax(syntax),
            Err(e) => warn!("Using plain Jinja syntax: {e}"),
        }

        for (name, transform) in transforms.iter() {
            env.add_filter(name, transform);
            env.add_function(name, transform);
        }

        Self { env }
    }
}

const BLOCK_SIGILS: [char; 4] = ['%', '@', '!', '$'];

/// Derives block and comment delimiters from the variable delimiters.
///
/// Blocks use `%` between the outer characters: `[[ ]]` gives `[% %]`.
/// When that would clash with the variable start (`<% %>`), the next sigil
/// of `BLOCK_SIGILS` is used instead. Comments wrap `/* */` in the variable
/// delimiters, so `{{/* note */}}` is a comment and `{#` is plain text.
fn syntax_for(delimiters: &Delimiters) -> std::result::Result<SyntaxConfig, minijinja::Error> {
    let left = delimiters.left();
    let right = delimiters.right();
    let open = left.chars().next().unwrap_or('{');
    let close = right.chars().last().unwrap_or('}');

    let (block_start, block_end) = BLOCK_SIGILS
        .iter()
        .map(|sigil| (format!("{open}{sigil}"), format!("{sigil}{close}")))
        .find(|(start, _)| start != left)
        .unwrap_or_else(|| (format!("{left}%"), format!("%{right}")));
    debug!("Template syntax: {left} {right}, {block_start} {block_end}, {left}/* */{right}");

    SyntaxConfig::builder()
        .variable_delimiters(left.to_string(), right.to_string())
        .block_delimiters(block_start, block_end)
        .comment_delimiters(format!("{left}/*"), format!("*/{right}"))
        .build()
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn add_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.env
            .add_template_owned(name.to_string(), template.to_string())
            .map_err(|source| Error::RenderError { name: name.to_string(), source })
    }

    fn render(&self, name: &str, template: &str, context: &Context) -> Result<String> {
        self.env
            .render_named_str(name, template, context)
            .map_err(|source| Error::RenderError { name: name.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::upper;

    fn render_with(delimiters: Delimiters, template: &str) -> Result<String> {
        let renderer = MiniJinjaRenderer::new(&delimiters, &TransformRegistry::standard());
        let context: Context =
            [("name", "FooBar"), ("package", "com.example.Widget")].into_iter().collect();
        renderer.render("test", template, &context)
    }

    #[test]
    fn test_variables_and_transforms() {
        let result = render_with(Delimiters::default(), "{{ name|snake }} {{ screaming_snake(name) }}");
        assert_eq!(result.unwrap(), "foo-bar FOO_BAR");

        let result = render_with(Delimiters::default(), "src/{{ package|prefix_path }}/{{ package|last_segment }}.java");
        assert_eq!(result.unwrap(), "src/com/example/Widget.java");
    }

    #[test]
    fn test_custom_delimiters() {
        let delimiters = Delimiters::new("[[", "]]");
        let result = render_with(delimiters, "[[ name|upper ]] {{ untouched }}");
        assert_eq!(result.unwrap(), "FOOBAR {{ untouched }}");

        let delimiters = Delimiters::new("[[", "]]");
        let result = render_with(delimiters, "[% if name %]yes[% endif %][[/* note */]]");
        assert_eq!(result.unwrap(), "yes");
    }

    #[test]
    fn test_keeps_trailing_newline_and_does_not_escape() {
        let result = render_with(Delimiters::default(), "<{{ name }}> & co\n");
        assert_eq!(result.unwrap(), "<FooBar> & co\n");
    }

    #[test]
    fn test_unknown_transform_fails() {
        let result = render_with(Delimiters::default(), "{{ name|title }}");
        assert!(matches!(result, Err(Error::RenderError { .. })));
    }

    #[test]
    fn test_invalid_syntax_fails() {
        let result = render_with(Delimiters::default(), "{{ name ");
        match result {
            Err(Error::RenderError { name, .. }) => assert_eq!(name, "test"),
            other => panic!("Expected RenderError, got {other:?}"),
        }
    }

    #[test]
    fn test_reduced_registry() {
        let transforms = TransformRegistry::new().with("upper", upper);
        let renderer = MiniJinjaRenderer::new(&Delimiters::default(), &transforms);
        let context: Context = [("name", "FooBar")].into_iter().collect();

        assert_eq!(renderer.render("t", "{{ name|upper }}", &context).unwrap(), "FOOBAR");
        assert!(renderer.render("t", "{{ name|snake }}", &context).is_err());
    }

    #[test]
    fn test_delimiters_sharing_the_block_sigil() {
        let result = render_with(Delimiters::new("<%", "%>"), "<% name|snake %>.<@ if name @>rs<@ endif @>");
        assert_eq!(result.unwrap(), "foo-bar.rs");

        let result = render_with(Delimiters::new("{%", "%}"), "{% name %}{@ if true @}!{@ endif @}");
        assert_eq!(result.unwrap(), "FooBar!");
    }

    #[test]
    fn test_comments_use_slash_star() {
        let result = render_with(Delimiters::default(), "{{/* dropped */}}{{ name }}");
        assert_eq!(result.unwrap(), "FooBar");
    }

    #[test]
    fn test_shell_length_expansion_is_plain_text() {
        let result = render_with(Delimiters::default(), "echo ${#arr[@]} {{ name }}\n");
        assert_eq!(result.unwrap(), "echo ${#arr[@]} FooBar\n");
    }

    #[test]
    fn test_added_templates_can_be_included() {
        let mut renderer = MiniJinjaRenderer::new(&Delimiters::default(), &TransformRegistry::standard());
        renderer.add_template("header.txt", "// {{ name|upper }}").unwrap();
        let context: Context = [("name", "FooBar")].into_iter().collect();

        let result = renderer.render("main", "{% include 'header.txt' %}\nbody", &context);
        assert_eq!(result.unwrap(), "// FOOBAR\nbody");
    }

    #[test]
    fn test_broken_added_template_fails() {
        let mut renderer = MiniJinjaRenderer::new(&Delimiters::default(), &TransformRegistry::standard());
        let result = renderer.add_template("broken.txt", "{{ name ");
        match result {
            Err(Error::RenderError { name, .. }) => assert_eq!(name, "broken.txt"),
            other => panic!("Expected RenderError, got {other:?}"),
        }
    }
}
