//! HTML template system for landing pages.
//!
//! A template is a document with named `{{ slot }}` placeholders. Each slot is
//! filled independently, either with text that gets HTML-escaped on insertion
//! or with a pre-rendered fragment. Inserted values are never rescanned, so a
//! fragment containing braces (inline scripts, JSON) cannot collide with slot
//! syntax.

use std::collections::HashMap;

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Template context with slot values.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill a slot with plain text, escaping it.
    pub fn insert_text(&mut self, key: impl Into<String>, value: &str) {
        self.variables.insert(key.into(), escape_html(value));
    }

    /// Fill a slot with an already-rendered HTML fragment.
    pub fn insert_html(&mut self, key: impl Into<String>, fragment: impl Into<String>) {
        self.variables.insert(key.into(), fragment.into());
    }

    #[must_use]
    pub fn with_text(mut self, key: impl Into<String>, value: &str) -> Self {
        self.insert_text(key, value);
        self
    }

    #[must_use]
    pub fn with_html(mut self, key: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.insert_html(key, fragment);
        self
    }

    /// Get a slot value as it will be inserted.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Check if a slot has a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

/// A template with `{{ slot }}` placeholders.
///
/// `{{ slot? }}` marks an optional slot that renders empty when unset.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = self.content.clone();
        let mut pos = 0;

        while let Some(start) = result[pos..].find("{{") {
            let start = pos + start;
            let end = result[start..]
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;
            let end = start + end + 2;

            let var_name = result[start + 2..end - 2].trim();

            let (var_name, optional) = if let Some(stripped) = var_name.strip_suffix('?') {
                (stripped, true)
            } else {
                (var_name, false)
            };

            let value = match context.get(var_name) {
                Some(v) => v.to_string(),
                None if optional => String::new(),
                None => return Err(TemplateError::MissingVariable(var_name.to_string())),
            };

            result.replace_range(start..end, &value);
            // skip past the inserted value so it is never reparsed
            pos = start + value.len();
        }

        Ok(result)
    }
}

/// Registry of templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(Template::new("landing", LANDING_TEMPLATE));
        self.register(Template::new("tracking_head", TRACKING_HEAD_TEMPLATE));
        self.register(Template::new("conversion_script", CONVERSION_SCRIPT_TEMPLATE));
    }

    /// Register a template, replacing any with the same name.
    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Render a named template with the given context.
    pub fn render(&self, name: &str, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        template.render(context)
    }
}

/// Analytics tag and CTA click tracking loaded in `<head>`.
pub const TRACKING_HEAD_TEMPLATE: &str = r#"<script async src="https://www.googletagmanager.com/gtag/js?id={{ measurement_id }}"></script>
    <script>window.dataLayer=window.dataLayer||[];function gtag(){dataLayer.push(arguments);}gtag('js',new Date());gtag('config','{{ measurement_id }}');gtag('config','{{ ads_id }}');gtag('config','{{ ads_id }}/{{ phone_conversion }}',{'phone_conversion_css_class':'gfn','phone_conversion_number':'{{ phone_display }}'});</script>
    <script>function gtagSendEvent(u){var c=function(){if(typeof u==='string')window.location=u};gtag('event','select_content',{content_type:'cta',event_label:'Service CTA',link_url:u,event_callback:c,event_timeout:2000});return false;}</script>"#;

/// Quote form handling and gclid persistence.
///
/// `event_label` must already be safe inside a single-quoted JS string.
pub const CONVERSION_SCRIPT_TEMPLATE: &str = r#"<script>
        function getQueryParam(n){var p=new URLSearchParams(window.location.search);var v=p.get(n);return v&&v.trim()?v.trim():''}
        function setCookie(n,v,a){if(!n)return;var parts=[n+'='+encodeURIComponent(v||'')];parts.push('path=/');if(a)parts.push('max-age='+a);parts.push('samesite=Lax');if(location.protocol==='https:')parts.push('secure');document.cookie=parts.join('; ')}
        function getCookie(n){var m=document.cookie.match(new RegExp('(?:^|; )'+n.replace(/([.$?*|{}()\[\]\\\/\+^])/g,'\\$1')+'=([^;]*)'));return m?decodeURIComponent(m[1]):''}
        function storeGclidFromUrl(){var g=getQueryParam('gclid');if(!g)return;try{localStorage.setItem('gclid',g);}catch(e){} setCookie('gclid',g,60*60*24*90)}
        function getStoredGclid(){try{var ls=localStorage.getItem('gclid');if(ls)return ls;}catch(e){} return getCookie('gclid')||''}
        function ensureGclidInput(f){if(!f)return;var el=f.querySelector('input[name="gclid"]');if(!el){el=document.createElement('input');el.type='hidden';el.name='gclid';f.appendChild(el)}var v=getStoredGclid();if(v)el.value=v}
        document.addEventListener('DOMContentLoaded',function(){try{storeGclidFromUrl();}catch(e){} var f=document.getElementById('quoteForm'); if(f) try{ensureGclidInput(f);}catch(e){}});
        function handleFormSubmit(ev){ev.preventDefault();var name=document.getElementById('name').value;var phone=document.getElementById('phone').value;var email=document.getElementById('email').value; if(!name||!phone){alert('Please provide your name and phone.');return false} var er=/^[^\s@]+@[^\s@]+\.[^\s@]+$/; if(email && !er.test(email)){alert('Please enter a valid email.');return false} var pr=/(\+?1[-. ]?)?\(?([0-9]{3})\)?[-. ]?([0-9]{3})[-. ]?([0-9]{4})$/; if(!pr.test(phone)){alert('Please enter a valid phone.');return false}
            var form=document.getElementById('quoteForm'); try{ensureGclidInput(form);}catch(e){} var btn=document.querySelector('.submit-button'); var t=btn.innerHTML; btn.innerHTML='<i class="fas fa-spinner fa-spin"></i> Processing...'; btn.disabled=true; var fd=new FormData(form); fetch(form.action,{method:'POST',body:fd,headers:{'Accept':'application/json'}}).then(function(r){ if(r.ok){ if(typeof gtag!=='undefined'){ gtag('event','generate_lead'); gtag('event','form_submission',{ 'event_category':'Quote','event_label':'{{ event_label }}' }); gtag('event','conversion',{ 'send_to':'{{ ads_id }}/{{ lead_conversion }}','value':1.0,'transaction_id':'lead_'+Date.now().toString() }); } window.location.href=form.getAttribute('_next')||'/thank-you.html'; } else { throw new Error('Network response was not ok'); }}).catch(function(e){ console.error('Error:',e); btn.innerHTML=t; btn.disabled=false; alert('There was a problem submitting your form. Please try again.');}); return false; }
    </script>"#;

/// Landing page document.
pub const LANDING_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    {{ tracking_head }}
    <meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="{{ meta_description }}">
    <title>{{ page_title }}</title>
    <link rel="canonical" href="{{ canonical_url }}"><link rel="icon" type="image/png" href="{{ favicon_url }}">
    <link rel="preconnect" href="https://www.googletagmanager.com" crossorigin>
    <link rel="preconnect" href="https://www.google-analytics.com" crossorigin>
    <link rel="preconnect" href="https://cdnjs.cloudflare.com" crossorigin>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.0.0/css/all.min.css">
    <link rel="preload" as="image" href="{{ hero_image_url }}" type="image/webp" fetchpriority="high">
    <style>
        html{scroll-behavior:smooth}*{margin:0;padding:0;box-sizing:border-box}body{font-family:'Arial',sans-serif;line-height:1.6;color:#333;background:#f8f9fa}
        header{position:fixed;top:0;left:0;right:0;background:rgba(0,0,0,.85);z-index:1000}.header-container{max-width:1200px;margin:0 auto;display:flex;align-items:center;justify-content:space-between;padding:.75rem 1rem}.logo{display:flex;align-items:center;color:#fff;text-decoration:none;font-weight:800}.logo img{height:44px;width:auto;margin-right:.5rem;display:block}.gfn{font-weight:800}.phone-number{color:#fff;text-decoration:none;font-weight:800;display:inline-flex;align-items:center;gap:.5rem}.phone-number i{color:#ff3333}
        .hero{background-image:linear-gradient(rgba(0,0,0,.6),rgba(0,0,0,.6)),url('{{ hero_image_url }}');background-size:cover;background-position:center;background-repeat:no-repeat;min-height:100vh;display:flex;align-items:center;padding:96px 1rem 2rem;color:#fff}
        .hero-inner{max-width:1200px;margin:0 auto;display:grid;grid-template-columns:1.1fr .9fr;gap:2rem;align-items:center}.hero-content{padding:1.5rem}.hero h1{font-size:3rem;font-weight:900;letter-spacing:-.02em;margin-bottom:.6rem;text-shadow:2px 2px 6px rgba(0,0,0,.4)}.hero p.sub{font-size:1.15rem;opacity:.95;margin-bottom:1rem}
        .hero-bullets{list-style:none;margin:1rem 0 1.25rem}.hero-bullets li{display:flex;align-items:center;gap:.6rem;margin-bottom:.5rem;font-weight:600}.hero-bullets i{color:#ff3333}
        .cta-button{background:#ff3333;color:#fff;text-decoration:none;display:inline-flex;align-items:center;justify-content:center;padding:14px 28px;border-radius:10px;font-weight:800;box-shadow:0 8px 24px rgba(255,51,51,.35);transition:transform .2s ease,box-shadow .2s ease,background .2s ease}.cta-button:hover{background:#e62e2e;transform:translateY(-2px);box-shadow:0 12px 34px rgba(255,51,51,.45)}
        .card{background:#fff;border:1px solid #e9ecef;border-radius:14px;box-shadow:0 8px 24px rgba(0,0,0,.06)}.quote-card{padding:1.5rem}.quote-card h2{text-align:center;color:#222;margin-bottom:1rem}
        .form{display:flex;flex-direction:column;gap:1rem}label{font-weight:700;color:#333}input,textarea,select{width:100%;padding:.8rem 1rem;border:1px solid #ced4da;border-radius:10px;font-family:inherit;font-size:1rem}
        textarea{min-height:110px;resize:vertical}.submit-button{background:#ff3333;color:#fff;border:none;border-radius:10px;padding:.9rem 1rem;font-weight:800;cursor:pointer;transition:transform .2s ease,background .2s ease}.submit-button:hover{background:#e62e2e;transform:translateY(-2px)}.form-note{text-align:center;color:#666;font-size:.92rem}
        .section{padding:3.5rem 1rem}.container{max-width:1200px;margin:0 auto}.section h2{text-align:center;font-size:2.2rem;font-weight:900;color:#222;margin-bottom:1.75rem}
        .grid-3{display:grid;grid-template-columns:repeat(3,1fr);gap:1rem}.grid-2{display:grid;grid-template-columns:repeat(2,1fr);gap:1rem}
        .feature{padding:1.25rem;background:#fff;border:1px solid #e9ecef;border-radius:14px;box-shadow:0 8px 24px rgba(0,0,0,.06)}.feature i{color:#ff3333;font-size:1.4rem;margin-right:.4rem}.feature h3{font-size:1.2rem;margin-bottom:.35rem;color:#222}.feature p{color:#555}
        .pill{display:inline-flex;align-items:center;justify-content:center;padding:.6rem .9rem;border-radius:999px;font-weight:800;font-size:.95rem}
        .chip{background:rgba(255,51,51,.08);border:1px solid rgba(255,51,51,.22);color:#c22020}
        .closing{text-align:center;color:#555;max-width:760px;margin:0 auto 1rem}
        @media (max-width:1024px){ .hero-inner{grid-template-columns:1fr} }
        @media (max-width:768px){ .hero{min-height:100svh;padding-top:72px} .hero h1{font-size:2.4rem} .grid-3,.grid-2{grid-template-columns:1fr} .quote-card{padding:1.25rem} }
    </style>
    {{ conversion_script }}
</head>
<body>
    <header><div class="header-container"><a href="/" class="logo"><img src="{{ logo_url }}" alt="{{ site_name }} logo"><span>{{ site_name }}</span></a><a href="tel:{{ phone_href }}" class="phone-number gfn"><i class="fas fa-phone"></i> {{ phone_display }}</a></div></header>
    <section class="hero"><div class="hero-inner">
        <div class="hero-content">
            <h1>{{ hero_heading }}</h1>
            <p class="sub">{{ hero_subheading }}</p>
            <ul class="hero-bullets">{{ hero_bullets }}</ul>
            <a href="tel:{{ phone_href }}" class="cta-button gfn">{{ cta_button_label }}</a>
        </div>
        <div class="card quote-card">
            <h2>{{ quote_heading }}</h2>
            <form id="quoteForm" class="form" action="{{ form_action }}" method="POST" onsubmit="return handleFormSubmit(event)">
                <input type="hidden" name="_subject" value="{{ form_subject }}">
                <input type="hidden" name="_next" value="{{ thank_you_url }}">
                <input type="text" name="_gotcha" style="display:none" aria-hidden="true" tabindex="-1">
                <div><label for="name">Full Name</label><input id="name" name="_name" type="text" required autocomplete="name"></div>
                <div><label for="phone">Phone Number</label><input id="phone" name="_phone" type="tel" required pattern="[\d\-\+\(\)\s]{10,}" autocomplete="tel"></div>
                <div><label for="email">Email Address <span style="font-weight:400;color:#777">(optional)</span></label><input id="email" name="_replyto" type="email" autocomplete="email" autocapitalize="off" autocorrect="off" spellcheck="false" inputmode="email"></div>
                <div><label for="details">{{ details_label }}</label><textarea id="details" name="_message" placeholder="{{ details_placeholder }}"></textarea></div>
                <button type="submit" class="submit-button">{{ submit_label }}</button>
                <p class="form-note">{{ form_note }}</p>
            </form>
        </div>
    </div></section>
    <section class="section"><div class="container"><h2>What We Take</h2><div class="grid-3">{{ what_we_take }}</div></div></section>
    <section class="section" style="background:#fff;"><div class="container"><h2>How It Works</h2><div class="grid-3">{{ how_it_works }}</div></div></section>
    <section class="section" style="background:#f8f9fa;"><div class="container"><h2>Pricing &amp; Availability</h2><div class="grid-2">{{ pricing }}</div><p style="text-align:center;margin-top:1rem"><a class="cta-button gfn" href="tel:{{ phone_href }}">{{ pricing_cta }}</a></p></div></section>
    <section class="section"><div class="container"><h2>Service Areas</h2><p style="text-align:center;margin-bottom:1rem;color:#555">{{ region }} and nearby, including:</p><div style="display:flex;flex-wrap:wrap;gap:.6rem;justify-content:center">{{ service_areas }}</div></div></section>
    <section class="section" id="faq" style="background:#fff;"><div class="container"><h2>{{ faq_heading }}</h2><div class="grid-2">{{ faq }}</div>{{ closing_copy? }}<p style="text-align:center;margin-top:1rem"><a class="cta-button gfn" href="tel:{{ phone_href }}">{{ faq_cta }}</a></p></div></section>
    <footer style="background:#111;color:#ddd;margin-top:2rem;"><div style="max-width:1200px;margin:0 auto;padding:2rem 1rem;display:flex;gap:2rem;flex-wrap:wrap;justify-content:space-between;"><div style="min-width:260px;flex:1;"><h4 style="color:#fff;margin-bottom:.75rem;">{{ site_name }}</h4><p style="color:#ccc;line-height:1.6;">Fast, friendly junk removal across {{ region }}. Same-day available. Licensed &amp; insured. Upfront pricing.</p><p style="margin-top:.75rem;color:#bbb;"><a class="gfn" href="tel:{{ phone_href }}" style="color:#fff;text-decoration:none;">{{ phone_display }}</a>&nbsp;&middot;&nbsp;<a href="/quote/" style="color:#ff6666;">Get a free quote</a></p></div><div style="display:flex;gap:2rem;flex-wrap:wrap;flex:1;justify-content:flex-end;min-width:260px;"><div><h4 style="color:#fff;margin-bottom:.75rem;">Links</h4><ul style="list-style:none;padding:0;margin:0;line-height:1.9;"><li><a href="/" style="color:#ccc;text-decoration:none;">Home</a></li><li><a href="/quote/" style="color:#ccc;text-decoration:none;">Quote</a></li><li><a href="/privacy-policy.html" style="color:#ccc;text-decoration:none;">Privacy</a></li></ul></div></div></div><div style="border-top:1px solid rgba(255,255,255,.1);padding:1rem;text-align:center;color:#888;"><p style="margin:0;">&copy; {{ year }} {{ site_name }}. All rights reserved.</p></div></footer>
    <script type="application/ld+json">{{ service_json_ld }}</script>
    <script type="application/ld+json">{{ faq_json_ld }}</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_simple_render() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new().with_text("name", "World");

        let result = template.render(&ctx).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_text_is_escaped_and_html_is_not() {
        let template = Template::new("test", "<p>{{ text }}</p>{{ fragment }}");
        let ctx = TemplateContext::new()
            .with_text("text", "<b>\"Tom\" & 'Jerry'</b>")
            .with_html("fragment", "<i>ok</i>");

        let result = template.render(&ctx).unwrap();
        assert_eq!(
            result,
            "<p>&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;</p><i>ok</i>"
        );
    }

    #[test]
    fn test_inserted_values_are_not_reparsed() {
        let template = Template::new("test", "<script>{{ body }}</script><p>{{ after }}</p>");
        let ctx = TemplateContext::new()
            .with_html("body", "var o={{ nested }};function f(){return {a:1}}")
            .with_text("after", "done");

        let result = template.render(&ctx).unwrap();
        assert_eq!(
            result,
            "<script>var o={{ nested }};function f(){return {a:1}}</script><p>done</p>"
        );
    }

    #[test]
    fn test_template_optional_variable() {
        let template = Template::new("test", "Hello{{ suffix? }}!");
        let ctx = TemplateContext::new();

        let result = template.render(&ctx).unwrap();
        assert_eq!(result, "Hello!");

        let ctx = TemplateContext::new().with_text("suffix", ", World");
        let result = template.render(&ctx).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_template_missing_required_variable() {
        let template = Template::new("test", "Hello, {{ name }}!");
        let ctx = TemplateContext::new();

        let result = template.render(&ctx);
        assert!(matches!(result, Err(TemplateError::MissingVariable(_))));
    }

    #[test]
    fn test_template_unclosed_delimiter() {
        let template = Template::new("test", "Hello, {{ name");
        let result = template.render(&TemplateContext::new());
        assert!(matches!(result, Err(TemplateError::InvalidSyntax(_))));
    }

    #[test]
    fn test_template_registry() {
        let registry = TemplateRegistry::new();

        assert!(registry.get("landing").is_some());
        assert!(registry.get("tracking_head").is_some());
        assert!(registry.get("conversion_script").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert!(matches!(
            registry.render("nonexistent", &TemplateContext::new()),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_conversion_script_only_has_known_slots() {
        let registry = TemplateRegistry::new();
        let ctx = TemplateContext::new()
            .with_html("event_label", "Hot Tub Removal")
            .with_text("ads_id", "AW-1")
            .with_text("lead_conversion", "abc");

        let script = registry.render("conversion_script", &ctx).unwrap();
        assert!(script.contains("'event_label':'Hot Tub Removal'"));
        assert!(script.contains("'send_to':'AW-1/abc'"));
        assert!(!script.contains("{{"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }
}
