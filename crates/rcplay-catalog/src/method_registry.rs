//! Declarative registry of base automation operations.
//!
//! Top-level entries are broad categories ("action", "assertion", ...). Each
//! holds named subcategories which list raw operation names, plus the naming
//! variants that turn a raw name into user-facing step names and, for
//! assertion-like categories, the rule producing negated step names.

const GETTER_PREFIXES: [&str; 2] = ["is", "get"];
const NEGATABLE_PREFIXES: [&str; 4] = ["is", "get", "verify", "assert"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Name transform producing a step name from a base operation name.
pub enum NameVariant {
    Identity,
    /// Appends a fixed suffix, e.g. `click` -> `clickAndWait`.
    Suffix(&'static str),
    /// Replaces a leading `is`/`get` with the prefix, e.g. `isChecked` -> `assertChecked`.
    /// Names without a getter prefix pass through unchanged.
    ReplaceGetterPrefix(&'static str),
}

impl NameVariant {
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Identity => name.to_string(),
            Self::Suffix(suffix) => format!("{name}{suffix}"),
            Self::ReplaceGetterPrefix(prefix) => GETTER_PREFIXES
                .iter()
                .find_map(|getter| name.strip_prefix(getter))
                .map(|rest| format!("{prefix}{rest}"))
                .unwrap_or_else(|| name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Rule producing the negated form of an (already variant-transformed) step name.
pub enum NegationRule {
    /// `...Present` -> `...NotPresent`, otherwise `Not` after a leading
    /// `is`/`get`/`verify`/`assert`.
    Default,
    /// `...Present` -> `...NotPresent`, otherwise the first `waitFor` becomes `waitForNot`.
    WaitFor,
}

impl NegationRule {
    pub fn apply(self, name: &str) -> String {
        if let Some(stem) = name.strip_suffix("Present") {
            return format!("{stem}NotPresent");
        }
        match self {
            Self::Default => NEGATABLE_PREFIXES
                .iter()
                .find_map(|prefix| {
                    name.strip_prefix(prefix)
                        .map(|rest| format!("{prefix}Not{rest}"))
                })
                .unwrap_or_else(|| name.to_string()),
            Self::WaitFor => name.replacen("waitFor", "waitForNot", 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Named group of raw operation names inside a registry category.
pub struct RegistrySubcategory {
    pub name: String,
    pub label: String,
    pub contents: Vec<String>,
}

impl RegistrySubcategory {
    pub fn new(name: &str, contents: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: humanize_label(name),
            contents: contents.iter().map(|entry| (*entry).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Broad registry category with its naming variants and optional negation rule.
pub struct RegistryCategory {
    pub name: String,
    pub label: String,
    pub variants: Vec<NameVariant>,
    pub negation: Option<NegationRule>,
    pub subcategories: Vec<RegistrySubcategory>,
}

impl RegistryCategory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: humanize_label(name),
            variants: Vec::new(),
            negation: None,
            subcategories: Vec::new(),
        }
    }

    pub fn with_variants(mut self, variants: &[NameVariant]) -> Self {
        self.variants = variants.to_vec();
        self
    }

    pub fn with_negation(mut self, rule: NegationRule) -> Self {
        self.negation = Some(rule);
        self
    }

    pub fn with_subcategory(mut self, name: &str, contents: &[&str]) -> Self {
        self.subcategories
            .push(RegistrySubcategory::new(name, contents));
        self
    }

    /// Appends copies of `subcategories`; later edits to either side stay independent.
    pub fn with_copied_subcategories(mut self, subcategories: &[RegistrySubcategory]) -> Self {
        self.subcategories.extend(subcategories.iter().cloned());
        self
    }

    /// Declared variants, or the identity variant when none were declared.
    pub fn effective_variants(&self) -> Vec<NameVariant> {
        if self.variants.is_empty() {
            vec![NameVariant::Identity]
        } else {
            self.variants.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Ordered list of registry categories.
pub struct MethodRegistry {
    pub categories: Vec<RegistryCategory>,
}

impl MethodRegistry {
    pub fn new(categories: Vec<RegistryCategory>) -> Self {
        Self { categories }
    }

    pub fn category(&self, name: &str) -> Option<&RegistryCategory> {
        self.categories
            .iter()
            .find(|category| category.name == name)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut RegistryCategory> {
        self.categories
            .iter_mut()
            .find(|category| category.name == name)
    }
}

/// Turns a registry key like `mouse_events` into a display label like `Mouse events`.
pub fn humanize_label(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Registry of the Selenium 1 (remote control) step vocabulary.
pub fn method_registry() -> MethodRegistry {
    let action = RegistryCategory::new("action")
        .with_variants(&[NameVariant::Identity, NameVariant::Suffix("AndWait")])
        .with_subcategory(
            "clicks",
            &[
                "click",
                "clickAt",
                "doubleClick",
                "doubleClickAt",
                "dragAndDrop",
                "dragAndDropToObject",
            ],
        )
        .with_subcategory(
            "mouse_events",
            &[
                "mouseDown",
                "mouseDownAt",
                "mouseDownRight",
                "mouseDownRightAt",
                "mouseMove",
                "mouseMoveAt",
                "mouseOut",
                "mouseOver",
                "mouseUp",
                "mouseUpAt",
                "mouseUpRight",
                "mouseUpRightAt",
            ],
        )
        .with_subcategory(
            "keyboard_events",
            &[
                "keyDown",
                "keyDownNative",
                "keyPress",
                "keyPressNative",
                "keyUp",
                "keyUpNative",
                "type",
                "typeKeys",
            ],
        )
        .with_subcategory(
            "keyboard_modifiers",
            &[
                "altKeyDown",
                "altKeyUp",
                "controlKeyDown",
                "controlKeyUp",
                "metaKeyDown",
                "metaKeyUp",
                "shiftKeyDown",
                "shiftKeyUp",
            ],
        )
        .with_subcategory(
            "form_fields",
            &[
                "addSelection",
                "check",
                "focus",
                "removeAllSelections",
                "removeSelection",
                "select",
                "setCursorPosition",
                "submit",
                "uncheck",
            ],
        )
        .with_subcategory(
            "browsing",
            &[
                "close",
                "goBack",
                "open",
                "openWindow",
                "refresh",
                "selectFrame",
                "selectWindow",
                "windowFocus",
                "windowMaximize",
            ],
        )
        .with_subcategory(
            "popups_and_menus",
            &[
                "answerOnNextPrompt",
                "chooseCancelOnNextConfirmation",
                "chooseOkOnNextConfirmation",
                "contextMenu",
                "contextMenuAt",
            ],
        );

    let assertion = RegistryCategory::new("assertion")
        .with_variants(&[
            NameVariant::ReplaceGetterPrefix("assert"),
            NameVariant::ReplaceGetterPrefix("verify"),
        ])
        .with_negation(NegationRule::Default)
        .with_subcategory(
            "page_content",
            &[
                "getAllLinks",
                "getAttribute",
                "getBodyText",
                "isElementPresent",
                "getHtmlSource",
                "isOrdered",
                "getTable",
                "getText",
                "isTextPresent",
                "isVisible",
            ],
        )
        .with_subcategory(
            "page_positioning",
            &[
                "getElementHeight",
                "getElementIndex",
                "getElementPositionLeft",
                "getElementPositionTop",
                "getElementWidth",
            ],
        )
        .with_subcategory(
            "popups",
            &[
                "isAlertPresent",
                "isConfirmationPresent",
                "isPromptPresent",
                "getPrompt",
                "getConfirmation",
                "getAlert",
            ],
        )
        .with_subcategory(
            "browser_window",
            &[
                "getAllWindowIds",
                "getAllWindowNames",
                "getAllWindowTitles",
                "getAttributeFromAllWindows",
                "getLocation",
                "getTitle",
            ],
        )
        .with_subcategory(
            "form_fields",
            &[
                "getAllButtons",
                "getAllFields",
                "isChecked",
                "getCursorPosition",
                "isEditable",
                "getSelectOptions",
                "getSelectedIds",
                "getSelectedIndexes",
                "getSelectedLabels",
                "getSelectedValues",
                "isSomethingSelected",
                "getValue",
            ],
        )
        .with_subcategory(
            "selenium",
            &[
                "getExpression",
                "getEval",
                "getMouseSpeed",
                "getSpeed",
                "getXpathCount",
            ],
        )
        .with_subcategory(
            "cookies",
            &["getCookie", "getCookieByName", "isCookiePresent"],
        );

    // Wait-for shares the assertion subcategories after its own "common" one.
    let wait = RegistryCategory::new("wait")
        .with_variants(&[NameVariant::ReplaceGetterPrefix("waitFor")])
        .with_negation(NegationRule::WaitFor)
        .with_subcategory(
            "common",
            &[
                "waitForCondition",
                "waitForFrameToLoad",
                "waitForPageToLoad",
                "waitForPopUp",
            ],
        )
        .with_copied_subcategories(&assertion.subcategories);

    let other = RegistryCategory::new("other")
        .with_subcategory(
            "selenium_settings",
            &[
                "addLocationStrategy",
                "allowNativeXpath",
                "ignoreAttributesWithoutValue",
                "setBrowserLogLevel",
                "setContext",
                "setMouseSpeed",
                "setSpeed",
                "setTimeout",
                "useXpathLibrary",
            ],
        )
        .with_subcategory(
            "screenshots",
            &[
                "captureEntirePageScreenshot",
                "captureScreenshot",
                "captureScreenshotToString",
            ],
        )
        .with_subcategory(
            "cookies",
            &["createCookie", "deleteCookie", "deleteAllVisibleCookies"],
        )
        .with_subcategory(
            "special",
            &[
                "addScript",
                "assignId",
                "fireEvent",
                "highlight",
                "rollup",
                "runScript",
                "echo",
                "pause",
            ],
        );

    let store = RegistryCategory::new("store")
        .with_variants(&[NameVariant::ReplaceGetterPrefix("store")])
        .with_copied_subcategories(&assertion.subcategories);

    MethodRegistry::new(vec![action, assertion, wait, other, store])
}

#[cfg(test)]
mod tests {
    use super::{humanize_label, method_registry, NameVariant, NegationRule};

    #[test]
    fn unit_getter_prefix_variant_only_rewrites_leading_prefix() {
        let assert = NameVariant::ReplaceGetterPrefix("assert");
        assert_eq!(assert.apply("isTextPresent"), "assertTextPresent");
        assert_eq!(assert.apply("getTitle"), "assertTitle");
        assert_eq!(assert.apply("waitForCondition"), "waitForCondition");
        assert_eq!(NameVariant::Suffix("AndWait").apply("click"), "clickAndWait");
        assert_eq!(NameVariant::Identity.apply("pause"), "pause");
    }

    #[test]
    fn unit_default_negation_handles_presence_and_prefixes() {
        let rule = NegationRule::Default;
        assert_eq!(rule.apply("assertTextPresent"), "assertTextNotPresent");
        assert_eq!(rule.apply("verifyChecked"), "verifyNotChecked");
        assert_eq!(rule.apply("assertTitle"), "assertNotTitle");
        assert_eq!(rule.apply("isVisible"), "isNotVisible");
    }

    #[test]
    fn unit_wait_negation_inserts_not_after_wait_for() {
        let rule = NegationRule::WaitFor;
        assert_eq!(rule.apply("waitForAlertPresent"), "waitForAlertNotPresent");
        assert_eq!(rule.apply("waitForChecked"), "waitForNotChecked");
        assert_eq!(rule.apply("waitForCondition"), "waitForNotCondition");
    }

    #[test]
    fn functional_registry_declares_categories_in_order() {
        let registry = method_registry();
        let names = registry
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["action", "assertion", "wait", "other", "store"]);

        let wait = registry.category("wait").expect("wait category");
        assert_eq!(wait.subcategories[0].name, "common");
        let assertion = registry.category("assertion").expect("assertion category");
        assert_eq!(wait.subcategories.len(), assertion.subcategories.len() + 1);
        assert_eq!(
            registry.category("other").expect("other").effective_variants(),
            vec![NameVariant::Identity]
        );
    }

    #[test]
    fn regression_store_subcategories_are_copies_not_aliases() {
        let mut registry = method_registry();
        registry
            .category_mut("store")
            .expect("store category")
            .subcategories[0]
            .contents
            .push("getSomethingExtra".to_string());

        let assertion = registry.category("assertion").expect("assertion");
        assert!(!assertion.subcategories[0]
            .contents
            .iter()
            .any(|name| name == "getSomethingExtra"));
        let wait = registry.category("wait").expect("wait");
        assert!(!wait.subcategories[1]
            .contents
            .iter()
            .any(|name| name == "getSomethingExtra"));
    }

    #[test]
    fn unit_humanize_label_capitalizes_and_spaces() {
        assert_eq!(humanize_label("mouse_events"), "Mouse events");
        assert_eq!(humanize_label("action"), "Action");
        assert_eq!(humanize_label(""), "");
    }
}
