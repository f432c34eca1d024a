// crates/nbs_config/src/coral.rs

//! 珊瑚模型常数
//!
//! 默认值对应文献中的珊瑚生长模型参数。可通过键值输入文件覆盖，
//! 键名同时接受原始写法（如 `Ikmax`、`betaI`）与蛇形命名（如 `ik_max`）。

use std::f64::consts::PI;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::input_file::InputParameters;

/// 珊瑚模型常数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoralConstants {
    // ========================================================================
    // 过程开关
    // ========================================================================
    /// 光照微环境
    pub lme: bool,
    /// 流动微环境
    pub fme: bool,
    /// 热微环境
    pub tme: bool,
    /// 光合作用的流速依赖
    pub pfd: bool,
    /// 过程组合不一致时发出警告
    pub warn_proc: bool,

    // ========================================================================
    // 光照
    // ========================================================================
    /// 最大饱和光强 [µE m-2 s-1]
    pub ik_max: f64,
    /// 最大光合速率 [-]
    pub pm_max: f64,
    /// 饱和光强的光适应指数 [-]
    pub beta_i: f64,
    /// 最大光合速率的光适应指数 [-]
    pub beta_p: f64,
    /// 补偿光强比例 [-]
    pub i_comp: f64,
    /// 光线最大入射角 [rad]
    pub theta_max: f64,
    /// 默认光衰减系数 [m-1]
    pub kd0: f64,

    // ========================================================================
    // 流动
    // ========================================================================
    /// Smagorinsky 系数 [-]
    pub cs: f64,
    /// 惯性力系数 [-]
    pub cm: f64,
    /// 冠层摩擦系数 [-]
    pub cf: f64,
    /// 运动粘度 [m2 s-1]
    pub nu: f64,
    /// 热扩散系数 [m2 s-1]
    pub alpha: f64,
    /// 冠层长宽比 [-]
    pub psi: f64,
    /// 波流夹角 [°]
    pub wc_angle: f64,
    /// 速度边界层常数 [-]
    pub rd: f64,
    /// 数值格式的隐式权重 [-]
    pub numeric_theta: f64,
    /// 迭代收敛容差 [-]
    pub err: f64,
    /// 波数迭代上限
    pub max_iter_k: usize,
    /// 衰减系数迭代上限
    pub max_iter_aw: usize,

    // ========================================================================
    // 热
    // ========================================================================
    /// 珊瑚组织热导率 [W m-1 K-1]
    pub k0: f64,
    /// 珊瑚吸收率 [-]
    pub ap: f64,
    /// 海水热导率 [W m-1 K-1]
    pub k: f64,

    // ========================================================================
    // 光合-温度
    // ========================================================================
    /// 活化能 [J mol-1]
    pub ea: f64,
    /// 气体常数 [J K-1 mol-1]
    pub r: f64,
    /// 热变化范围系数 [-]
    pub k_var: f64,
    /// 热适应时间尺度 [yr]
    pub nn: f64,

    // ========================================================================
    // 光合-流速
    // ========================================================================
    /// 流速依赖的最小值 [-]
    pub pfd_min: f64,
    /// 临界流速 [m s-1]
    pub ucr: f64,

    // ========================================================================
    // 种群
    // ========================================================================
    /// 生长速率 [d-1]
    pub r_growth: f64,
    /// 恢复速率 [d-1]
    pub r_recovery: f64,
    /// 死亡速率 [d-1]
    pub r_mortality: f64,
    /// 白化速率 [d-1]
    pub r_bleaching: f64,

    // ========================================================================
    // 钙化
    // ========================================================================
    /// 钙化常数 [kg m-2 d-1]
    pub g_c: f64,
    /// 默认文石饱和度 [-]
    pub omega_a0: f64,
    /// 零钙化时的文石饱和度 [-]
    pub omega0: f64,
    /// 文石半饱和常数 [-]
    pub kappa_a: f64,

    // ========================================================================
    // 形态
    // ========================================================================
    /// 形状比例系数 [-]
    pub prop_form: f64,
    /// 板片比例系数 [-]
    pub prop_plate: f64,
    /// 板片比例的流速系数 [-]
    pub prop_plate_flow: f64,
    /// 间距比例系数 [-]
    pub prop_space: f64,
    /// 间距比例的光照系数 [-]
    pub prop_space_light: f64,
    /// 间距比例的流速系数 [-]
    pub prop_space_flow: f64,
    /// 基准流速 [m s-1]
    pub u0: f64,
    /// 珊瑚骨骼密度 [kg m-3]
    pub rho_c: f64,

    // ========================================================================
    // 剥离
    // ========================================================================
    /// 基底抗拉强度 [N m-2]
    pub sigma_t: f64,
    /// 阻力系数 [-]
    pub cd: f64,
    /// 海水密度 [kg m-3]
    pub rho_w: f64,

    // ========================================================================
    // 补充
    // ========================================================================
    /// 每个珊瑚产生的幼体数 [-]
    pub no_larvae: f64,
    /// 定殖概率 [-]
    pub prob_settle: f64,
    /// 幼体直径 [m]
    pub d_larvae: f64,

    // ========================================================================
    // 模拟
    // ========================================================================
    /// 模拟年数
    pub sim_duration: usize,
    /// 起始日期
    pub start_date: NaiveDate,
}

impl Default for CoralConstants {
    fn default() -> Self {
        Self {
            lme: true,
            fme: true,
            tme: true,
            pfd: true,
            warn_proc: true,

            ik_max: 372.32,
            pm_max: 1.0,
            beta_i: 0.34,
            beta_p: 0.09,
            i_comp: 0.01,
            theta_max: 0.5 * PI,
            kd0: 0.1,

            cs: 0.17,
            cm: 1.7,
            cf: 0.01,
            nu: 1e-6,
            alpha: 1e-7,
            psi: 2.0,
            wc_angle: 0.0,
            rd: 500.0,
            numeric_theta: 0.5,
            err: 1e-3,
            max_iter_k: 100_000,
            max_iter_aw: 100_000,

            k0: 80.0,
            ap: 0.4,
            k: 0.6089,

            ea: 6e4,
            r: 8.31446261815324,
            k_var: 2.45,
            nn: 60.0,

            pfd_min: 0.68886964,
            ucr: 0.17162374,

            r_growth: 0.002,
            r_recovery: 0.2,
            r_mortality: 0.04,
            r_bleaching: 8.0,

            g_c: 0.5,
            omega_a0: 5.0,
            omega0: 0.14587415,
            kappa_a: 0.66236107,

            prop_form: 0.1,
            prop_plate: 0.5,
            prop_plate_flow: 0.1,
            prop_space: 0.5 / 2f64.sqrt(),
            prop_space_light: 0.1,
            prop_space_flow: 0.1,
            u0: 0.2,
            rho_c: 1600.0,

            sigma_t: 2e5,
            cd: 1.0,
            rho_w: 1025.0,

            no_larvae: 1e6,
            prob_settle: 1e-4,
            d_larvae: 1e-3,

            sim_duration: 100,
            start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        }
    }
}

/// 以多个候选键覆盖数值字段
macro_rules! override_f64 {
    ($params:expr, $field:expr, [$($key:literal),+]) => {
        if let Some(v) = $params.first_f64(&[$($key),+])? {
            $field = v;
        }
    };
}

impl CoralConstants {
    /// 从键值输入文件读取，未出现的键保留默认值
    pub fn from_input_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let params = InputParameters::from_file(path)?;
        let mut constants = Self::default();
        constants.apply(&params)?;
        debug!("从 {:?} 读取 {} 个珊瑚常数", params.source(), params.len());
        Ok(constants)
    }

    /// 用输入参数覆盖当前值，并修正过程开关
    pub fn apply(&mut self, p: &InputParameters) -> Result<(), ConfigError> {
        if let Some(v) = p.get_bool("lme")? {
            self.lme = v;
        }
        if let Some(v) = p.get_bool("fme")? {
            self.fme = v;
        }
        if let Some(v) = p.get_bool("tme")? {
            self.tme = v;
        }
        if let Some(v) = p.get_bool("pfd")? {
            self.pfd = v;
        }
        if let Some(v) = p.first_bool(&["warn_proc", "warn"])? {
            self.warn_proc = v;
        }

        override_f64!(p, self.ik_max, ["Ikmax", "ik_max"]);
        override_f64!(p, self.pm_max, ["Pmmax", "pm_max"]);
        override_f64!(p, self.beta_i, ["betaI", "beta_i"]);
        override_f64!(p, self.beta_p, ["betaP", "beta_p"]);
        override_f64!(p, self.i_comp, ["Icomp", "i_comp"]);
        override_f64!(p, self.theta_max, ["theta_max"]);
        override_f64!(p, self.kd0, ["Kd0", "kd0"]);

        override_f64!(p, self.cs, ["Cs", "cs"]);
        override_f64!(p, self.cm, ["Cm", "cm"]);
        override_f64!(p, self.cf, ["Cf", "cf"]);
        override_f64!(p, self.nu, ["nu"]);
        override_f64!(p, self.alpha, ["alpha"]);
        override_f64!(p, self.psi, ["psi"]);
        override_f64!(p, self.wc_angle, ["wcAngle", "wc_angle"]);
        override_f64!(p, self.rd, ["rd"]);
        override_f64!(p, self.numeric_theta, ["numericTheta", "numeric_theta"]);
        override_f64!(p, self.err, ["err"]);
        if let Some(v) = p.first_f64(&["maxiter_k", "max_iter_k"])? {
            self.max_iter_k = Self::to_count("maxiter_k", v)?;
        }
        if let Some(v) = p.first_f64(&["maxiter_aw", "max_iter_aw"])? {
            self.max_iter_aw = Self::to_count("maxiter_aw", v)?;
        }

        override_f64!(p, self.k0, ["K0", "k0"]);
        override_f64!(p, self.ap, ["ap"]);
        override_f64!(p, self.k, ["k"]);

        override_f64!(p, self.ea, ["Ea", "ea"]);
        override_f64!(p, self.r, ["R", "r"]);
        override_f64!(p, self.k_var, ["k_var"]);
        override_f64!(p, self.nn, ["nn"]);

        override_f64!(p, self.pfd_min, ["pfd_min"]);
        override_f64!(p, self.ucr, ["ucr"]);

        override_f64!(p, self.r_growth, ["r_growth"]);
        override_f64!(p, self.r_recovery, ["r_recovery"]);
        override_f64!(p, self.r_mortality, ["r_mortality"]);
        override_f64!(p, self.r_bleaching, ["r_bleaching"]);

        override_f64!(p, self.g_c, ["gC", "g_c"]);
        override_f64!(p, self.omega_a0, ["omegaA0", "omega_a0"]);
        override_f64!(p, self.omega0, ["omega0"]);
        override_f64!(p, self.kappa_a, ["kappaA", "kappa_a"]);

        override_f64!(p, self.prop_form, ["prop_form"]);
        override_f64!(p, self.prop_plate, ["prop_plate"]);
        override_f64!(p, self.prop_plate_flow, ["prop_plate_flow"]);
        override_f64!(p, self.prop_space, ["prop_space"]);
        override_f64!(p, self.prop_space_light, ["prop_space_light"]);
        override_f64!(p, self.prop_space_flow, ["prop_space_flow"]);
        override_f64!(p, self.u0, ["u0"]);
        override_f64!(p, self.rho_c, ["rho_c"]);

        override_f64!(p, self.sigma_t, ["sigma_t"]);
        override_f64!(p, self.cd, ["Cd", "cd"]);
        override_f64!(p, self.rho_w, ["rho_w"]);

        override_f64!(p, self.no_larvae, ["no_larvae"]);
        override_f64!(p, self.prob_settle, ["prob_settle"]);
        override_f64!(p, self.d_larvae, ["d_larvae"]);

        if let Some(v) = p.get_f64("sim_duration")? {
            self.sim_duration = Self::to_count("sim_duration", v)?;
        }
        if let Some(s) = p.get_str("start_date")? {
            self.start_date = nbs_foundation::calendar::parse_date(s)
                .map_err(|e| ConfigError::invalid("start_date", s, e.to_string()))?;
        }

        self.correct_processes();
        Ok(())
    }

    fn to_count(key: &str, v: f64) -> Result<usize, ConfigError> {
        if v < 0.0 || v.fract() != 0.0 {
            return Err(ConfigError::invalid(key, v, "必须为非负整数"));
        }
        Ok(v as usize)
    }

    /// 修正不一致的过程组合
    ///
    /// 热微环境依赖光照与流动微环境；流速依赖的光合作用依赖流动微环境。
    pub fn correct_processes(&mut self) {
        if self.tme && !(self.lme && self.fme) {
            if self.warn_proc {
                warn!(
                    "热微环境 (tme) 需要光照 (lme) 与流动 (fme) 微环境, 已关闭 tme"
                );
            }
            self.tme = false;
        }
        if self.pfd && !self.fme {
            if self.warn_proc {
                warn!("流速依赖的光合作用 (pfd) 需要流动微环境 (fme), 已关闭 pfd");
            }
            self.pfd = false;
        }
    }

    /// 验证数值合理性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ik_max", self.ik_max),
            ("pm_max", self.pm_max),
            ("nu", self.nu),
            ("alpha", self.alpha),
            ("k0", self.k0),
            ("k", self.k),
            ("ucr", self.ucr),
            ("u0", self.u0),
            ("rho_c", self.rho_c),
            ("rho_w", self.rho_w),
            ("sigma_t", self.sigma_t),
            ("nn", self.nn),
        ];
        for (key, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::invalid(key, value, "必须为正"));
            }
        }
        let rates = [
            ("r_growth", self.r_growth),
            ("r_recovery", self.r_recovery),
            ("r_mortality", self.r_mortality),
            ("r_bleaching", self.r_bleaching),
        ];
        for (key, value) in rates {
            if value < 0.0 {
                return Err(ConfigError::invalid(key, value, "速率不能为负"));
            }
        }
        if !(0.0..=1.0).contains(&self.pfd_min) {
            return Err(ConfigError::invalid("pfd_min", self.pfd_min, "必须在 [0, 1] 范围内"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let c = CoralConstants::default();
        assert!(c.validate().is_ok());
        assert!((c.theta_max - 0.5 * PI).abs() < 1e-12);
        assert!(c.lme && c.fme && c.tme && c.pfd);
    }

    #[test]
    fn test_override_with_original_names() {
        let content = "Ikmax = 400.0\nbetaI = 0.3\nmaxiter_k = 10\nsim_duration = 5\nstart_date = '2010-01-01'\n";
        let params = InputParameters::parse_str(content, None).unwrap();
        let mut c = CoralConstants::default();
        c.apply(&params).unwrap();
        assert!((c.ik_max - 400.0).abs() < 1e-10);
        assert!((c.beta_i - 0.3).abs() < 1e-10);
        assert_eq!(c.max_iter_k, 10);
        assert_eq!(c.sim_duration, 5);
        assert_eq!(c.start_date, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
    }

    #[test]
    fn test_tme_requires_fme() {
        let params = InputParameters::parse_str("fme = False\n", None).unwrap();
        let mut c = CoralConstants::default();
        c.apply(&params).unwrap();
        assert!(!c.fme);
        assert!(!c.tme);
        assert!(!c.pfd);
        assert!(c.lme);
    }

    #[test]
    fn test_tme_requires_lme() {
        let params = InputParameters::parse_str("lme = False\n", None).unwrap();
        let mut c = CoralConstants::default();
        c.apply(&params).unwrap();
        assert!(!c.tme);
        assert!(c.pfd);
    }

    #[test]
    fn test_negative_count_rejected() {
        let params = InputParameters::parse_str("sim_duration = -2\n", None).unwrap();
        let mut c = CoralConstants::default();
        assert!(c.apply(&params).is_err());
    }

    #[test]
    fn test_from_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coral_input.txt");
        std::fs::write(&path, "# thermal\nK0 = 90\n").unwrap();
        let c = CoralConstants::from_input_file(&path).unwrap();
        assert!((c.k0 - 90.0).abs() < 1e-10);
    }
}
