//! HTML pages served by the web front end.

use std::fmt::Write;
use visitlog_core::report::{Bucket, Summary};
use visitlog_core::stats::share;

const STYLE: &str = "body{font-family:sans-serif;margin:2em auto;max-width:60em;color:#222}\
nav a{margin-right:1em}\
.cards{display:flex;gap:1em}\
.card{border:1px solid #ccc;border-radius:6px;padding:1em;flex:1;text-align:center}\
.card strong{display:block;font-size:2em}\
.charts{display:grid;grid-template-columns:1fr 1fr;gap:1em;margin-top:1em}\
.message{padding:.75em;background:#eef6ee;border:1px solid #9c9}\
label{display:block;margin:.5em 0}";

/// Minimal HTML escaping for text and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Início</a><a href=\"/registrar\">Registrar</a><a href=\"/dashboard\">Dashboard</a></nav>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}

pub fn index() -> String {
    layout(
        "Controle de Acesso",
        "<p>Registro de entrada e saída de visitantes.</p>\n\
         <ul>\n<li><a href=\"/registrar\">Registrar entrada ou saída</a></li>\n\
         <li><a href=\"/dashboard\">Ver estatísticas</a></li>\n\
         <li><a href=\"/dados\">Dados em JSON</a></li>\n</ul>",
    )
}

/// Registration form, optionally preceded by the outcome of the last submission
pub fn registration(message: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(message) = message {
        let _ = writeln!(body, "<p class=\"message\">{}</p>", escape(message));
    }
    body.push_str(
        "<form method=\"post\" action=\"/registrar\">\n\
         <label>Nome <input name=\"nome\" required></label>\n\
         <label>CPF <input name=\"cpf\" required></label>\n\
         <label>Empresa <input name=\"empresa\"></label>\n\
         <label>Destino <input name=\"destino\"></label>\n\
         <label><input type=\"radio\" name=\"tipo_acesso\" value=\"entrada\" checked> Entrada</label>\n\
         <label><input type=\"radio\" name=\"tipo_acesso\" value=\"saida\"> Saída</label>\n\
         <button type=\"submit\">Registrar</button>\n</form>",
    );
    layout("Registrar Acesso", &body)
}

/// Inline SVG bar chart of labelled counts
pub fn bar_chart(title: &str, buckets: &[Bucket]) -> String {
    const WIDTH: usize = 420;
    const HEIGHT: usize = 220;
    const AXIS: usize = 40;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<figure><figcaption>{}</figcaption>\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" role=\"img\">",
        escape(title)
    );

    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
    if max > 0 {
        let plot_height = HEIGHT - AXIS;
        let slot = (WIDTH / buckets.len()).max(1);
        let bar = (slot * 3 / 4).max(1);

        for (i, bucket) in buckets.iter().enumerate() {
            let h = bucket.count * plot_height / max;
            let x = i * slot + (slot - bar) / 2;
            let _ = write!(
                svg,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{bar}\" height=\"{h}\" fill=\"#6aa6d8\">\
                 <title>{label}: {count}</title></rect>\
                 <text x=\"{tx}\" y=\"{ty}\" font-size=\"10\" text-anchor=\"middle\">{label}</text>",
                y = plot_height - h,
                label = escape(&bucket.label),
                count = bucket.count,
                tx = i * slot + slot / 2,
                ty = plot_height + 14,
            );
        }
    }

    svg.push_str("</svg></figure>");
    svg
}

fn share_table(title: &str, buckets: &[Bucket], total: usize) -> String {
    let mut table = format!(
        "<figure><figcaption>{}</figcaption><table>",
        escape(title)
    );
    for bucket in buckets {
        let _ = write!(
            table,
            "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
            escape(&bucket.label),
            bucket.count,
            share(bucket.count, total)
        );
    }
    table.push_str("</table></figure>");
    table
}

pub fn dashboard(summary: &Summary) -> String {
    let mut body = format!(
        "<div class=\"cards\">\n\
         <div class=\"card\"><strong>{}</strong>Total de acessos</div>\n\
         <div class=\"card\"><strong>{}</strong>Acessos hoje</div>\n\
         <div class=\"card\"><strong>{}</strong>Pessoas presentes</div>\n</div>\n",
        summary.total_count, summary.count_today, summary.present_count
    );

    if summary.is_empty() {
        body.push_str("<p>Nenhum acesso registrado.</p>");
    } else {
        body.push_str("<div class=\"charts\">\n");
        body.push_str(&bar_chart("Acessos por Dia", &summary.by_day));
        body.push_str(&share_table(
            "Acessos por Destino",
            &summary.by_destination,
            summary.total_count,
        ));
        body.push_str(&bar_chart("Top Empresas", &summary.top_companies));
        body.push_str(&bar_chart("Acessos por Hora do Dia", &summary.by_hour));
        body.push_str("\n</div>");
    }

    layout("Dashboard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_registration_shows_escaped_message() {
        let page = registration(Some("Entry registered for <Alice>"));
        assert!(page.contains("Entry registered for &lt;Alice&gt;"));
        assert!(page.contains("name=\"tipo_acesso\""));
    }

    #[test]
    fn test_bar_chart_scales_to_max() {
        let buckets = vec![
            Bucket {
                label: "A".into(),
                count: 2,
            },
            Bucket {
                label: "B".into(),
                count: 1,
            },
        ];
        let svg = bar_chart("Top", &buckets);
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("height=\"180\""));
        assert!(svg.contains("height=\"90\""));
    }

    #[test]
    fn test_empty_dashboard() {
        let page = dashboard(&Summary::empty());
        assert!(page.contains("Nenhum acesso registrado"));
        assert!(!page.contains("<svg"));
    }
}
