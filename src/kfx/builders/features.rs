//! Reader compatibility declarations: `$585` conversion features and `$593`
//! format capabilities.

use crate::kfx::ion::IonValue;
use crate::kfx::symbols::sym;

const YJ_CONVERSION: &str = "com.amazon.yjconversion";

/// Build the `$585` value.
///
/// The reflow-section-size feature carries `reflow_section_size` as its major
/// version; values below 1 are raised to 1 since readers reject major 0.
pub fn build_content_features(reflow_section_size: i64) -> IonValue {
    let section_size = reflow_section_size.max(1);
    let features = vec![
        feature(YJ_CONVERSION, "reflow-style", 1, 0),
        feature(YJ_CONVERSION, "reflow-section-size", section_size, 0),
        feature(YJ_CONVERSION, "reflow-language-expansion", 1, 0),
        feature("SDK.Marker", "CanonicalFormat", 1, 0),
    ];
    IonValue::structure()
        .set_list(sym::FEATURES, features)
        .build()
}

/// Build the `$593` value: `[{$492: "kfxgen.textBlock", version: 1}]`.
pub fn build_format_capabilities() -> IonValue {
    IonValue::List(vec![
        IonValue::structure()
            .set_str(sym::KEY, "kfxgen.textBlock")
            .set_int(sym::VERSION, 1)
            .build(),
    ])
}

/// `{$492: key, $586: namespace, $589: {version: {$587: major, $588: minor}}}`
fn feature(namespace: &str, key: &str, major: i64, minor: i64) -> IonValue {
    let version = IonValue::structure()
        .set_int(sym::MAJOR_VERSION, major)
        .set_int(sym::MINOR_VERSION, minor)
        .build();
    IonValue::structure()
        .set_str(sym::KEY, key)
        .set_str(sym::NAMESPACE, namespace)
        .set(
            sym::VERSION_INFO,
            IonValue::structure().set(sym::VERSION, version).build(),
        )
        .build()
}
