//! Auto-submitting HTML form that redirects the payer to the gateway.

use maud::{html, PreEscaped};

/// Form element id used by the auto-submit script.
pub const FORM_ID: &str = "newebpay";

/// Render a hidden form posting `fields` to `action`, plus a script that submits it.
///
/// Names, values and the action URL are escaped by `maud`.
pub fn render_form<K, V>(action: &str, fields: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let fields: Vec<(&str, &str)> = fields
        .iter()
        .map(|(name, value)| (name.as_ref(), value.as_ref()))
        .collect();
    let submit_script = format!(
        r#"<script type="text/javascript">document.getElementById("{}").submit();</script>"#,
        FORM_ID
    );

    html! {
        form id=(FORM_ID) method="post" action=(action) style="display:none;" {
            @for (name, value) in &fields {
                input type="hidden" name=(name) value=(value);
            }
            input type="submit" value="Submit";
        }
        (PreEscaped(submit_script))
    }
    .into_string()
}
