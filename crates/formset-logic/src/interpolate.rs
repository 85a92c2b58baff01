//! `{{ path }}` placeholder interpolation for event names and text actions

use serde_json::Value;

use crate::context::{lookup_path, EvaluationContext};

/// Replace every `{{ path }}` with the value it points to.
///
/// `data.*` reads the root data, `row.*` the row, and a bare path tries the
/// row and then the root data. `key` is the evaluating component's key.
/// Unresolved placeholders become empty strings.
pub fn interpolate(template: &str, ctx: &EvaluationContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str(&resolve(after[..end].trim(), ctx));
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve(expr: &str, ctx: &EvaluationContext<'_>) -> String {
    if expr == "key" {
        return ctx.component_key.to_string();
    }

    let value = if let Some(path) = expr.strip_prefix("data.") {
        lookup_path(ctx.data, path)
    } else if let Some(path) = expr.strip_prefix("row.") {
        lookup_path(ctx.row, path)
    } else {
        ctx.value_of(expr)
    };

    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interpolate() {
        let data = json!({"user": {"name": "Ada"}, "count": 3});
        let ctx = EvaluationContext::new(&data).with_component_key("tabs");

        assert_eq!(interpolate("Hello {{ data.user.name }}", &ctx), "Hello Ada");
        assert_eq!(interpolate("{{key}}-refresh", &ctx), "tabs-refresh");
        assert_eq!(interpolate("n={{ count }}", &ctx), "n=3");
        assert_eq!(interpolate("{{ missing }}!", &ctx), "!");
        assert_eq!(interpolate("plain", &ctx), "plain");
        assert_eq!(interpolate("open {{ data.user", &ctx), "open {{ data.user");
    }
}
