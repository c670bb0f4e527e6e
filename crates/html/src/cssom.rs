use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssRule {
    pub css_text: String,
}

/// Raised when script reads the rules of a sheet it may not inspect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityError {
    pub message: String,
}

impl fmt::Display for SecurityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecurityError: {}", self.message)
    }
}

impl std::error::Error for SecurityError {}

/// The object model behind one `<style>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSheet {
    rules: Vec<CssRule>,
    cross_origin: bool,
}

impl StyleSheet {
    pub fn parse(text: &str) -> Self {
        Self {
            rules: split_rules(text)
                .into_iter()
                .map(|css_text| CssRule { css_text })
                .collect(),
            cross_origin: false,
        }
    }

    /// A sheet whose rules came from another origin and cannot be read back.
    pub fn cross_origin(mut self) -> Self {
        self.cross_origin = true;
        self
    }

    pub fn css_rules(&self) -> Result<&[CssRule], SecurityError> {
        if self.cross_origin {
            return Err(SecurityError {
                message: "Cannot access rules of a cross-origin stylesheet".to_string(),
            });
        }
        Ok(&self.rules)
    }

    /// `CSSStyleSheet.insertRule`: the element's text is left untouched.
    pub fn insert_rule(&mut self, css_text: &str, index: usize) -> usize {
        let index = index.min(self.rules.len());
        self.rules.insert(
            index,
            CssRule {
                css_text: css_text.trim().to_string(),
            },
        );
        index
    }
}

// input: "a { color: red } @media print { b { x: y } } @import url(x.css);"
// output: ["a { color: red }", "@media print { b { x: y } }", "@import url(x.css);"]
pub fn split_rules(input: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match ch {
            '/' if chars.peek() == Some(&'*') => {
                let _ = chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                current.push(ch);
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    push_rule(&mut rules, &mut current);
                }
            }
            ';' if depth == 0 => {
                current.push(ch);
                push_rule(&mut rules, &mut current);
            }
            _ => current.push(ch),
        }
    }
    push_rule(&mut rules, &mut current);
    rules
}

fn push_rule(rules: &mut Vec<String>, current: &mut String) {
    let collapsed = current.split_whitespace().collect::<Vec<_>>().join(" ");
    current.clear();
    if !collapsed.is_empty() && collapsed != ";" {
        rules.push(collapsed);
    }
}
