//! Built-in catalog for autocentrum.pl technical data
//!
//! Specification pages live under `/dane-techniczne/`; the same path under
//! `/spalanie/` holds fuel consumption reports and under `/oceny/` owner
//! ratings.

use url::Url;

use crate::assembler::{PageSpec, PathSubstitution};
use crate::config::CatalogConfig;
use crate::error::ConfigError;
use crate::extractors::{Css, FieldSpec, Locator, Pick, TextMatch, Transform, ValueKind};
use crate::hierarchy::HierarchyLevel;

pub const ROOT_URL: &str = "https://www.autocentrum.pl/dane-techniczne/";

const PARAM_VALUE: &str = "span.dt-param-edit + span.dt-param-value";
const MODEL_LINKS: &str = "div.car-selector-box-row a";

fn is(label: &str) -> TextMatch {
    TextMatch::Is(label.to_string())
}

fn has(label: &str) -> TextMatch {
    TextMatch::OwnContains(label.to_string())
}

/// Value cell of a row in the technical data table.
fn param(label: TextMatch) -> Result<Locator, ConfigError> {
    Locator::labelled("div", label, "div", PARAM_VALUE)
}

/// Number in the consumption summary next to `label`.
fn summary(label: &str) -> Result<Locator, ConfigError> {
    Locator::labelled("div", has(label), "div.sateh-right", "div.satehr-small")
}

fn levels() -> Result<Vec<HierarchyLevel>, ConfigError> {
    Ok(vec![
        HierarchyLevel::new("brand", Css::parse("div.mark-list a")?),
        HierarchyLevel::new("model", Css::parse(MODEL_LINKS)?),
        HierarchyLevel::new("generation", Css::parse(MODEL_LINKS)?).collapsing(),
        HierarchyLevel::new("version", Css::parse(MODEL_LINKS)?).collapsing(),
        HierarchyLevel::new("engine", Css::parse("div.engine-box a")?),
    ])
}

fn specification() -> Result<PageSpec, ConfigError> {
    use ValueKind::{Double, Integer, Text};

    let fields = vec![
        FieldSpec::new("name", Locator::css("h1.site-title")?, Text)
            .transform([Transform::remove("Dane techniczne"), Transform::Trim]),
        FieldSpec::new("doors", param(has("Liczba drzwi"))?, Integer),
        FieldSpec::new("seats", param(has("Liczba miejsc"))?, Integer),
        FieldSpec::new("length", param(is("Długość"))?, Integer).transform([Transform::remove("mm")]),
        FieldSpec::new("width", param(is("Szerokość"))?, Integer).transform([Transform::remove("mm")]),
        FieldSpec::new("height", param(is("Wysokość"))?, Integer).transform([Transform::remove("mm")]),
        FieldSpec::new("trunk", param(has("Minimalna pojemność bagażnika"))?, Integer)
            .transform([Transform::remove("l")]),
        // "od 2015 do 2019 roku"
        FieldSpec::new("year-from", param(is("Produkowany"))?, Integer).transform([Transform::token(1)]),
        FieldSpec::new("year-to", param(is("Produkowany"))?, Integer).transform([Transform::Token {
            index: 3,
            count: Some(5),
        }]),
        FieldSpec::new("cc", param(is("Pojemność skokowa"))?, Integer).transform([Transform::remove("cm3")]),
        FieldSpec::new(
            "fuel",
            Locator::labelled("div", is("Typ silnika"), "div", "span.dt-param-value")?,
            Text,
        ),
        FieldSpec::new("hp", param(is("Moc silnika"))?, Integer).transform([Transform::token(0)]),
        FieldSpec::new("vmax", param(is("Prędkość maksymalna"))?, Integer)
            .transform([Transform::remove("km/h")]),
        FieldSpec::new("acc", param(is("Przyspieszenie (od 0 do 100km/h)"))?, Double)
            .transform([Transform::remove("s"), Transform::replace(",", ".")]),
        FieldSpec::new("weight", param(has("Minimalna masa własna pojazdu"))?, Integer)
            .transform([Transform::remove("kg")]),
    ];

    Ok(PageSpec {
        name: "specification".to_string(),
        derive: None,
        fields,
    })
}

fn consumption() -> Result<PageSpec, ConfigError> {
    let average = || [Transform::replace(",", "."), Transform::remove("-")];

    // Petrol and LPG summaries share markup; LPG is the second block.
    // TODO: select the LPG block by its heading once the markup exposes one.
    let fields = vec![
        FieldSpec::new("fuel-reports-count", summary("Liczba raportów:")?, ValueKind::Integer),
        FieldSpec::new("fuel-avg", summary("Średnia z powyższych")?, ValueKind::Double)
            .transform(average()),
        FieldSpec::new("lpg-fuel-avg", summary("Średnia z powyższych")?, ValueKind::Double)
            .pick(Pick::Nth(1))
            .transform(average()),
        FieldSpec::new("lpg-reports-count", summary("Liczba raportów:")?, ValueKind::Integer)
            .pick(Pick::Nth(1)),
    ];

    Ok(PageSpec {
        name: "consumption".to_string(),
        derive: Some(PathSubstitution::new("dane-techniczne", "spalanie")),
        fields,
    })
}

fn rating() -> Result<PageSpec, ConfigError> {
    let fields = vec![
        // "Mamy 42 ocen tego auta"
        FieldSpec::new(
            "rating-count",
            Locator::text("h2", TextMatch::Contains("ocen tego auta".to_string()))?,
            ValueKind::Integer,
        )
        .transform([Transform::token(1)]),
        FieldSpec::new(
            "rating",
            Locator::labelled("div", has("Średnia ocena"), "span", "div.badge")?,
            ValueKind::Double,
        )
        .transform([Transform::replace(",", ".")]),
    ];

    Ok(PageSpec {
        name: "rating".to_string(),
        derive: Some(PathSubstitution::new("spalanie", "oceny")),
        fields,
    })
}

impl CatalogConfig {
    /// The autocentrum.pl catalog: brand → model → generation* → version* →
    /// engine, where starred levels may be absent for a model.
    pub fn autocentrum() -> Result<Self, ConfigError> {
        Ok(Self {
            root: Url::parse(ROOT_URL)?,
            levels: levels()?,
            pages: vec![specification()?, consumption()?, rating()?],
        })
    }
}
