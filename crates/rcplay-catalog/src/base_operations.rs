//! Automation API surface: base operations and their formal parameters.
//!
//! Parameter names are declared explicitly per operation. Different API
//! surfaces expose different subsets; registry names missing from a table are
//! simply not available there.

use std::collections::BTreeMap;

/// Browser-side Selenium Core operations. Native key events and screenshot
/// capture are implemented by the remote server only and are not listed.
const SELENIUM_CORE_OPERATIONS: &[(&str, &[&str])] = &[
    // clicks
    ("doClick", &["locator"]),
    ("doClickAt", &["locator", "coordString"]),
    ("doDoubleClick", &["locator"]),
    ("doDoubleClickAt", &["locator", "coordString"]),
    ("doDragAndDrop", &["locator", "movementsString"]),
    (
        "doDragAndDropToObject",
        &["locatorOfObjectToBeDragged", "locatorOfDragDestinationObject"],
    ),
    // mouse events
    ("doMouseDown", &["locator"]),
    ("doMouseDownAt", &["locator", "coordString"]),
    ("doMouseDownRight", &["locator"]),
    ("doMouseDownRightAt", &["locator", "coordString"]),
    ("doMouseMove", &["locator"]),
    ("doMouseMoveAt", &["locator", "coordString"]),
    ("doMouseOut", &["locator"]),
    ("doMouseOver", &["locator"]),
    ("doMouseUp", &["locator"]),
    ("doMouseUpAt", &["locator", "coordString"]),
    ("doMouseUpRight", &["locator"]),
    ("doMouseUpRightAt", &["locator", "coordString"]),
    // keyboard
    ("doKeyDown", &["locator", "keySequence"]),
    ("doKeyPress", &["locator", "keySequence"]),
    ("doKeyUp", &["locator", "keySequence"]),
    ("doType", &["locator", "value"]),
    ("doTypeKeys", &["locator", "value"]),
    ("doAltKeyDown", &[]),
    ("doAltKeyUp", &[]),
    ("doControlKeyDown", &[]),
    ("doControlKeyUp", &[]),
    ("doMetaKeyDown", &[]),
    ("doMetaKeyUp", &[]),
    ("doShiftKeyDown", &[]),
    ("doShiftKeyUp", &[]),
    // form fields
    ("doAddSelection", &["locator", "optionLocator"]),
    ("doCheck", &["locator"]),
    ("doFocus", &["locator"]),
    ("doRemoveAllSelections", &["locator"]),
    ("doRemoveSelection", &["locator", "optionLocator"]),
    ("doSelect", &["selectLocator", "optionLocator"]),
    ("doSetCursorPosition", &["locator", "position"]),
    ("doSubmit", &["formLocator"]),
    ("doUncheck", &["locator"]),
    // browsing
    ("doClose", &[]),
    ("doGoBack", &[]),
    ("doOpen", &["url"]),
    ("doOpenWindow", &["url", "windowID"]),
    ("doRefresh", &[]),
    ("doSelectFrame", &["locator"]),
    ("doSelectWindow", &["windowID"]),
    ("doWindowFocus", &[]),
    ("doWindowMaximize", &[]),
    // popups and menus
    ("doAnswerOnNextPrompt", &["answer"]),
    ("doChooseCancelOnNextConfirmation", &[]),
    ("doChooseOkOnNextConfirmation", &[]),
    ("doContextMenu", &["locator"]),
    ("doContextMenuAt", &["locator", "coordString"]),
    // page content
    ("getAllLinks", &[]),
    ("getAttribute", &["attributeLocator"]),
    ("getBodyText", &[]),
    ("isElementPresent", &["locator"]),
    ("getHtmlSource", &[]),
    ("isOrdered", &["locator1", "locator2"]),
    ("getTable", &["tableCellAddress"]),
    ("getText", &["locator"]),
    ("isTextPresent", &["target"]),
    ("isVisible", &["locator"]),
    // positioning
    ("getElementHeight", &["locator"]),
    ("getElementIndex", &["locator"]),
    ("getElementPositionLeft", &["locator"]),
    ("getElementPositionTop", &["locator"]),
    ("getElementWidth", &["locator"]),
    // popups
    ("isAlertPresent", &[]),
    ("isConfirmationPresent", &[]),
    ("isPromptPresent", &[]),
    ("getPrompt", &[]),
    ("getConfirmation", &[]),
    ("getAlert", &[]),
    // browser window
    ("getAllWindowIds", &[]),
    ("getAllWindowNames", &[]),
    ("getAllWindowTitles", &[]),
    ("getAttributeFromAllWindows", &["attributeName"]),
    ("getLocation", &[]),
    ("getTitle", &[]),
    // form field queries
    ("getAllButtons", &[]),
    ("getAllFields", &[]),
    ("isChecked", &["locator"]),
    ("getCursorPosition", &["locator"]),
    ("isEditable", &["locator"]),
    ("getSelectOptions", &["selectLocator"]),
    ("getSelectedIds", &["selectLocator"]),
    ("getSelectedIndexes", &["selectLocator"]),
    ("getSelectedLabels", &["selectLocator"]),
    ("getSelectedValues", &["selectLocator"]),
    ("isSomethingSelected", &["selectLocator"]),
    ("getValue", &["locator"]),
    // selenium state
    ("getExpression", &["expression"]),
    ("getEval", &["script"]),
    ("getMouseSpeed", &[]),
    ("getSpeed", &[]),
    ("getXpathCount", &["xpath"]),
    // cookies
    ("getCookie", &[]),
    ("getCookieByName", &["name"]),
    ("isCookiePresent", &["name"]),
    ("doCreateCookie", &["nameValuePair", "optionsString"]),
    ("doDeleteCookie", &["name", "optionsString"]),
    ("doDeleteAllVisibleCookies", &[]),
    // waits
    ("doWaitForCondition", &["script", "timeout"]),
    ("doWaitForFrameToLoad", &["frameAddress", "timeout"]),
    ("doWaitForPageToLoad", &["timeout"]),
    ("doWaitForPopUp", &["windowID", "timeout"]),
    // settings
    ("doAddLocationStrategy", &["strategyName", "functionDefinition"]),
    ("doAllowNativeXpath", &["allow"]),
    ("doIgnoreAttributesWithoutValue", &["ignore"]),
    ("doSetBrowserLogLevel", &["logLevel"]),
    ("doSetContext", &["context"]),
    ("doSetMouseSpeed", &["pixels"]),
    ("doSetSpeed", &["value"]),
    ("doSetTimeout", &["timeout"]),
    ("doUseXpathLibrary", &["libraryName"]),
    ("doCaptureEntirePageScreenshot", &["filename", "kwargs"]),
    // special
    ("doAddScript", &["scriptContent", "scriptTagId"]),
    ("doAssignId", &["locator", "identifier"]),
    ("doFireEvent", &["locator", "eventName"]),
    ("doHighlight", &["locator"]),
    ("doRollup", &["rollupName", "kwargs"]),
    ("doRunScript", &["script"]),
    ("doEcho", &["message"]),
    ("doPause", &["waitTime"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// A base operation found in an API surface.
pub struct ResolvedOperation {
    /// Name the operation resolved under, possibly `do`-prefixed.
    pub name: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Operation name -> declared parameter names. `None` marks an operation
/// whose signature is unknown.
pub struct BaseOperationTable {
    operations: BTreeMap<String, Option<Vec<String>>>,
}

impl BaseOperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selenium_core() -> Self {
        SELENIUM_CORE_OPERATIONS
            .iter()
            .fold(Self::new(), |table, (name, params)| {
                table.with_operation(name, params)
            })
    }

    pub fn with_operation(mut self, name: &str, params: &[&str]) -> Self {
        self.operations.insert(
            name.to_string(),
            Some(params.iter().map(|param| (*param).to_string()).collect()),
        );
        self
    }

    /// Registers an operation without a known signature; it resolves with no parameters.
    pub fn with_opaque_operation(mut self, name: &str) -> Self {
        self.operations.insert(name.to_string(), None);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Looks up `registry_name` directly, then as `do` + capitalized name.
    pub fn resolve(&self, registry_name: &str) -> Option<ResolvedOperation> {
        if let Some(params) = self.operations.get(registry_name) {
            return Some(ResolvedOperation {
                name: registry_name.to_string(),
                params: params.clone().unwrap_or_default(),
            });
        }
        let imperative = imperative_name(registry_name);
        self.operations
            .get(&imperative)
            .map(|params| ResolvedOperation {
                name: imperative,
                params: params.clone().unwrap_or_default(),
            })
    }
}

/// `click` -> `doClick`.
pub fn imperative_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("do{}{}", first.to_uppercase(), chars.as_str()),
        None => "do".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{imperative_name, BaseOperationTable};

    #[test]
    fn unit_imperative_name_capitalizes_first_letter() {
        assert_eq!(imperative_name("click"), "doClick");
        assert_eq!(imperative_name("waitForPageToLoad"), "doWaitForPageToLoad");
        assert_eq!(imperative_name(""), "do");
    }

    #[test]
    fn unit_resolve_prefers_direct_name_then_do_prefix() {
        let table = BaseOperationTable::selenium_core();
        let direct = table.resolve("getText").expect("getText resolves");
        assert_eq!(direct.name, "getText");
        assert_eq!(direct.params, vec!["locator"]);

        let imperative = table.resolve("click").expect("click resolves");
        assert_eq!(imperative.name, "doClick");
        assert_eq!(imperative.params, vec!["locator"]);
    }

    #[test]
    fn unit_server_only_operations_are_absent_from_core_surface() {
        let table = BaseOperationTable::selenium_core();
        assert!(table.resolve("keyDownNative").is_none());
        assert!(table.resolve("captureScreenshot").is_none());
        assert!(table.resolve("captureScreenshotToString").is_none());
    }

    #[test]
    fn regression_opaque_operation_resolves_with_empty_parameters() {
        let table = BaseOperationTable::new().with_opaque_operation("doMystery");
        let resolved = table.resolve("mystery").expect("opaque resolves");
        assert_eq!(resolved.name, "doMystery");
        assert!(resolved.params.is_empty());
    }
}
