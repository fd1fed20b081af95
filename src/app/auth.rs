// ==========================================
// Rebaixa Pro - 登录校验
// ==========================================
// 两个固定角色（admin / user），密码来自配置
// 未配置密码的账户不可登录
// ==========================================

use crate::app::error::{AppError, AppResult};
use crate::config::AccountConfig;
use crate::domain::user::User;
use tracing::{info, warn};

pub fn authenticate(accounts: &[AccountConfig], login: &str, password: &str) -> AppResult<User> {
    let account = accounts
        .iter()
        .find(|a| a.login == login)
        .ok_or(AppError::InvalidCredentials)?;

    if account.password.is_empty() {
        warn!(login = %account.login, "账户未配置密码");
        return Err(AppError::AccountNotConfigured(account.login.clone()));
    }

    if account.password != password {
        warn!(login = %account.login, "登录失败");
        return Err(AppError::InvalidCredentials);
    }

    info!(login = %account.login, perfil = %account.perfil, "登录成功");
    Ok(User {
        login: account.login.clone(),
        nome: account.nome.clone(),
        perfil: account.perfil,
    })
}
