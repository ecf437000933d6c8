//! Synthetic catalog pages in the autocentrum.pl markup.

#![allow(dead_code)]

pub fn brand_list(hrefs: &[&str]) -> String {
    wrap(&format!(r#"<div class="mark-list">{}</div>"#, anchors(hrefs)))
}

pub fn selector_row(hrefs: &[&str]) -> String {
    wrap(&format!(
        r#"<div class="car-selector-box-row">{}</div>"#,
        anchors(hrefs)
    ))
}

pub fn engine_list(hrefs: &[&str]) -> String {
    let boxes: String = hrefs
        .iter()
        .map(|href| format!(r#"<div class="engine-box"><a href="{href}">{href}</a></div>"#))
        .collect();
    wrap(&boxes)
}

pub fn specification(name: &str, hp: &str, acc: &str) -> String {
    wrap(&format!(
        r#"<h1 class="site-title">{name} Dane techniczne</h1>{}{}"#,
        param("Moc silnika", hp),
        param("Przyspieszenie (od 0 do 100km/h)", acc),
    ))
}

pub fn consumption(reports: &str, average: &str) -> String {
    wrap(&format!(
        r#"<div><div>Liczba raportów:</div><div class="sateh-right"><div class="satehr-small">{reports}</div></div></div>
           <div><div>Średnia z powyższych</div><div class="sateh-right"><div class="satehr-small">{average}</div></div></div>"#
    ))
}

pub fn rating(count: u32, average: &str) -> String {
    wrap(&format!(
        r#"<h2>Mamy {count} ocen tego auta</h2><div><div>Średnia ocena</div><span><div class="badge">{average}</div></span></div>"#
    ))
}

fn param(label: &str, value: &str) -> String {
    format!(
        r#"<div><div>{label}</div><div><span class="dt-param-edit">i</span><span class="dt-param-value">{value}</span></div></div>"#
    )
}

fn anchors(hrefs: &[&str]) -> String {
    hrefs
        .iter()
        .map(|href| format!(r#"<a href="{href}">{href}</a>"#))
        .collect()
}

fn wrap(body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>t</title></head><body>{body}</body></html>")
}
