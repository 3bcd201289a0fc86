//! Fills in the Riot Client login form through UI Automation.

use crate::error::AppError;

/// Returns `Ok(false)` while the login form is not on screen yet.
#[cfg(windows)]
pub fn fill_login_form(pids: &[u32], username: &str, password: &str) -> Result<bool, AppError> {
    windows_impl::fill_login_form(pids, username, password)
}

#[cfg(not(windows))]
pub fn fill_login_form(_pids: &[u32], _username: &str, _password: &str) -> Result<bool, AppError> {
    ensure_supported().map(|()| false)
}

/// Fails before anything is launched on platforms without UI Automation.
pub fn ensure_supported() -> Result<(), AppError> {
    if cfg!(windows) {
        Ok(())
    } else {
        Err(AppError::Unsupported(
            "Riot Client login automation needs Windows UI Automation".to_string(),
        ))
    }
}

#[cfg(windows)]
mod windows_impl {
    use crate::error::AppError;
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};
    use std::thread;
    use std::time::Duration;
    use windows::Win32::System::Com::{
        CoCreateInstance, CoInitializeEx, CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED,
    };
    use windows::Win32::UI::Accessibility::{
        CUIAutomation, IUIAutomation, IUIAutomationElement, TreeScope_Children,
        TreeScope_Descendants, UIA_EditControlTypeId, UIA_PaneControlTypeId,
    };
    use windows::Win32::UI::WindowsAndMessaging::{SetForegroundWindow, ShowWindow, SW_RESTORE};

    const WINDOW_NAME: &str = "Riot Client";
    const USERNAME_FIELD: &str = "username";
    const PASSWORD_FIELD: &str = "password";

    fn com_error(e: windows::core::Error) -> AppError {
        AppError::Automation(e.message().to_string())
    }

    fn input_error(e: impl std::fmt::Display) -> AppError {
        AppError::Automation(format!("keyboard input failed: {}", e))
    }

    pub fn fill_login_form(pids: &[u32], username: &str, password: &str) -> Result<bool, AppError> {
        let automation = automation()?;
        let Some(window) = find_window(&automation, pids)? else {
            return Ok(false);
        };

        let scope = find_descendant(&automation, &window, |e| {
            name_of(e) == WINDOW_NAME && control_type_is(e, UIA_PaneControlTypeId)
        })?
        .unwrap_or_else(|| window.clone());

        let Some(username_edit) = find_edit(&automation, &scope, USERNAME_FIELD)? else {
            return Ok(false);
        };
        let Some(password_edit) = find_edit(&automation, &scope, PASSWORD_FIELD)? else {
            return Ok(false);
        };

        bring_to_front(&window);

        let mut enigo = Enigo::new(&Settings::default()).map_err(input_error)?;
        type_into(&mut enigo, &username_edit, username)?;
        log::debug!("Username entered");
        type_into(&mut enigo, &password_edit, password)?;
        log::debug!("Password entered");

        thread::sleep(Duration::from_millis(100));
        unsafe { password_edit.SetFocus() }.map_err(com_error)?;
        thread::sleep(Duration::from_millis(50));
        enigo.key(Key::Return, Direction::Click).map_err(input_error)?;
        Ok(true)
    }

    fn automation() -> Result<IUIAutomation, AppError> {
        unsafe {
            // S_FALSE when this thread was already initialised.
            let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
            CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER).map_err(com_error)
        }
    }

    /// Top-level window titled "Riot Client" or owned by one of `pids`.
    fn find_window(automation: &IUIAutomation, pids: &[u32]) -> Result<Option<IUIAutomationElement>, AppError> {
        unsafe {
            let root = automation.GetRootElement().map_err(com_error)?;
            let condition = automation.CreateTrueCondition().map_err(com_error)?;
            let windows = root.FindAll(TreeScope_Children, &condition).map_err(com_error)?;

            let mut by_pid = None;
            for i in 0..windows.Length().map_err(com_error)? {
                let window = windows.GetElement(i).map_err(com_error)?;
                if name_of(&window) == WINDOW_NAME {
                    return Ok(Some(window));
                }
                let pid = window.CurrentProcessId().unwrap_or_default() as u32;
                if by_pid.is_none() && pids.contains(&pid) {
                    by_pid = Some(window);
                }
            }
            Ok(by_pid)
        }
    }

    fn find_descendant<F>(
        automation: &IUIAutomation,
        scope: &IUIAutomationElement,
        matches: F,
    ) -> Result<Option<IUIAutomationElement>, AppError>
    where
        F: Fn(&IUIAutomationElement) -> bool,
    {
        unsafe {
            let condition = automation.CreateTrueCondition().map_err(com_error)?;
            let found = scope.FindAll(TreeScope_Descendants, &condition).map_err(com_error)?;
            for i in 0..found.Length().map_err(com_error)? {
                let element = found.GetElement(i).map_err(com_error)?;
                if matches(&element) {
                    return Ok(Some(element));
                }
            }
        }
        Ok(None)
    }

    fn find_edit(
        automation: &IUIAutomation,
        scope: &IUIAutomationElement,
        automation_id: &str,
    ) -> Result<Option<IUIAutomationElement>, AppError> {
        find_descendant(automation, scope, |e| {
            let id = unsafe { e.CurrentAutomationId() }.map(|s| s.to_string()).unwrap_or_default();
            id == automation_id && control_type_is(e, UIA_EditControlTypeId)
        })
    }

    fn name_of(element: &IUIAutomationElement) -> String {
        unsafe { element.CurrentName() }
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    fn control_type_is(
        element: &IUIAutomationElement,
        wanted: windows::Win32::UI::Accessibility::UIA_CONTROLTYPE_ID,
    ) -> bool {
        unsafe { element.CurrentControlType() }.map_or(false, |t| t == wanted)
    }

    fn bring_to_front(window: &IUIAutomationElement) {
        if let Ok(hwnd) = unsafe { window.CurrentNativeWindowHandle() } {
            unsafe {
                let _ = ShowWindow(hwnd, SW_RESTORE);
                let _ = SetForegroundWindow(hwnd);
            }
        }
    }

    /// Focuses the field, clears it and types `text`.
    fn type_into(enigo: &mut Enigo, field: &IUIAutomationElement, text: &str) -> Result<(), AppError> {
        unsafe { field.SetFocus() }.map_err(com_error)?;
        thread::sleep(Duration::from_millis(50));

        enigo.key(Key::Control, Direction::Press).map_err(input_error)?;
        let selected = enigo.key(Key::Unicode('a'), Direction::Click);
        enigo.key(Key::Control, Direction::Release).map_err(input_error)?;
        selected.map_err(input_error)?;
        enigo.key(Key::Backspace, Direction::Click).map_err(input_error)?;
        enigo.text(text).map_err(input_error)
    }
}
